//! Calculator for headline journal statistics: total P&L, win rate, equity.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::JournalSnapshot;

use super::equity::current_equity;

/// Headline numbers shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalStats {
    /// Sum of every entry's P&L
    pub total_pnl: Decimal,

    /// Number of entries
    pub total_entries: u32,

    /// Entries with positive P&L
    pub win_count: u32,

    /// Entries with negative P&L (zero counts as neither)
    pub loss_count: u32,

    /// Percentage of winning entries, one decimal place
    pub win_rate: Decimal,

    /// Initial capital plus deposits minus withdrawals
    pub current_capital: Decimal,

    /// Current capital plus total P&L
    pub current_equity: Decimal,
}

/// Calculator for snapshot-wide statistics.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute statistics from the raw entry list and capital record.
    ///
    /// These are flat sums: no date parsing or ordering is involved.
    pub fn calculate(snapshot: &JournalSnapshot) -> JournalStats {
        let entries = &snapshot.entries;
        let capital = snapshot.capital.as_ref();

        let total_entries = entries.len() as u32;
        let win_count = entries.iter().filter(|e| e.is_win()).count() as u32;
        let loss_count = entries.iter().filter(|e| e.is_loss()).count() as u32;

        JournalStats {
            total_pnl: entries.iter().map(|e| e.pnl).sum(),
            total_entries,
            win_count,
            loss_count,
            win_rate: Self::win_rate(win_count, total_entries),
            current_capital: capital.map(|c| c.current_capital()).unwrap_or(Decimal::ZERO),
            current_equity: current_equity(entries, capital),
        }
    }

    /// `wins / total * 100`, rounded half away from zero to one decimal.
    fn win_rate(wins: u32, total: u32) -> Decimal {
        if total == 0 {
            return Decimal::ZERO;
        }

        (Decimal::from(wins) * dec!(100) / Decimal::from(total))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CapitalState, CapitalTransaction, TradeEntry, TransactionType};

    fn entry(id: &str, pnl: Decimal) -> TradeEntry {
        TradeEntry {
            id: id.to_string(),
            date: "2024-01-01".to_string(),
            pnl,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = StatsCalculator::calculate(&JournalSnapshot::default());

        assert_eq!(stats, JournalStats::default());
        assert_eq!(stats.win_rate, Decimal::ZERO);
    }

    #[test]
    fn test_win_loss_counts() {
        let snapshot = JournalSnapshot::new(
            vec![
                entry("1", dec!(100)),
                entry("2", dec!(-50)),
                entry("3", dec!(200)),
                entry("4", dec!(0)),
            ],
            None,
        );
        let stats = StatsCalculator::calculate(&snapshot);

        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.win_count, 2);
        assert_eq!(stats.loss_count, 1);
        assert_eq!(stats.total_pnl, dec!(250));
        assert_eq!(stats.win_rate, dec!(50.0));
        assert_eq!(stats.current_capital, Decimal::ZERO);
        assert_eq!(stats.current_equity, dec!(250));
    }

    #[test]
    fn test_win_rate_rounds_to_one_decimal() {
        let snapshot = JournalSnapshot::new(
            vec![entry("1", dec!(1)), entry("2", dec!(1)), entry("3", dec!(-1))],
            None,
        );
        assert_eq!(StatsCalculator::calculate(&snapshot).win_rate, dec!(66.7));

        let one_in_eight = JournalSnapshot::new(
            (0..8)
                .map(|i| entry(&i.to_string(), if i == 0 { dec!(1) } else { dec!(-1) }))
                .collect(),
            None,
        );
        // 12.5 exactly, stays 12.5
        assert_eq!(StatsCalculator::calculate(&one_in_eight).win_rate, dec!(12.5));
    }

    #[test]
    fn test_current_equity_includes_capital() {
        let capital = CapitalState {
            initial_capital: dec!(1000),
            transactions: vec![
                CapitalTransaction {
                    id: "d".to_string(),
                    date: "2024-01-05".to_string(),
                    kind: TransactionType::Deposit,
                    amount: dec!(500),
                    notes: None,
                },
                CapitalTransaction {
                    id: "w".to_string(),
                    date: "2024-01-09".to_string(),
                    kind: TransactionType::Withdrawal,
                    amount: dec!(150),
                    notes: None,
                },
            ],
        };
        let snapshot = JournalSnapshot::new(vec![entry("1", dec!(-100))], Some(capital));
        let stats = StatsCalculator::calculate(&snapshot);

        assert_eq!(stats.current_capital, dec!(1350));
        assert_eq!(stats.current_equity, dec!(1250));
    }
}
