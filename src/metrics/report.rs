//! Dashboard report: every derived series computed from one snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{JournalConfig, PnlView};
use crate::models::JournalSnapshot;

use super::buckets::{cumulative, daily_buckets, monthly_buckets, recent_daily_buckets, DailyPnl, MonthlyPnl};
use super::equity::{equity_curve, EquityPoint};
use super::summary::{JournalStats, StatsCalculator};

/// Aggregation output handed to the presentation side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: JournalStats,
    pub monthly: Vec<MonthlyPnl>,
    pub monthly_cumulative: Vec<Decimal>,
    pub daily: Vec<DailyPnl>,
    pub daily_cumulative: Vec<Decimal>,
    pub recent_daily: Vec<DailyPnl>,
    pub equity_curve: Vec<EquityPoint>,

    /// Which P&L breakdown the text report shows
    #[serde(skip)]
    pub view: PnlView,
}

impl Dashboard {
    pub fn build(snapshot: &JournalSnapshot, config: &JournalConfig) -> Self {
        let monthly = monthly_buckets(&snapshot.entries);
        let monthly_cumulative = cumulative(monthly.iter().map(|m| m.total));
        let daily = daily_buckets(&snapshot.entries);
        let daily_cumulative = cumulative(daily.iter().map(|d| d.total));

        Self {
            stats: StatsCalculator::calculate(snapshot),
            monthly,
            monthly_cumulative,
            daily,
            daily_cumulative,
            recent_daily: recent_daily_buckets(&snapshot.entries, config.recent_entries),
            equity_curve: equity_curve(&snapshot.entries, snapshot.capital.as_ref()),
            view: config.pnl_view,
        }
    }

    pub fn with_view(mut self, view: PnlView) -> Self {
        self.view = view;
        self
    }
}

impl std::fmt::Display for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = &self.stats;

        writeln!(f, "\n{:=^60}", " JOURNAL DASHBOARD ")?;
        writeln!(f)?;
        writeln!(f, "Total P&L:      ${:.2}", s.total_pnl)?;
        writeln!(f, "Current Equity: ${:.2}", s.current_equity)?;
        writeln!(f, "Total Trades:   {}", s.total_entries)?;
        writeln!(f, "Win Rate:       {}%", s.win_rate)?;
        writeln!(f, "Wins / Losses:  {} / {}", s.win_count, s.loss_count)?;

        if s.total_entries == 0 {
            writeln!(f)?;
            writeln!(f, "No data available. Add some entries to see your charts!")?;
            writeln!(f, "{:=^60}", "")?;
            return Ok(());
        }

        writeln!(f)?;
        match self.view {
            PnlView::Monthly => {
                writeln!(f, "--- Monthly P&L ---")?;
                writeln!(f, "{:<10} {:>6} {:>14} {:>14}", "MONTH", "TRADES", "P&L", "CUMULATIVE")?;
                for (m, running) in self.monthly.iter().zip(&self.monthly_cumulative) {
                    writeln!(f, "{:<10} {:>6} {:>14.2} {:>14.2}", m.label, m.count, m.total, running)?;
                }
            }
            PnlView::Daily => {
                writeln!(f, "--- Daily P&L ---")?;
                writeln!(f, "{:<12} {:>14} {:>14}", "DATE", "P&L", "CUMULATIVE")?;
                for (d, running) in self.daily.iter().zip(&self.daily_cumulative) {
                    writeln!(f, "{:<12} {:>14.2} {:>14.2}", d.date.format("%b %d, %Y").to_string(), d.total, running)?;
                }
            }
        }

        if !self.equity_curve.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Equity Curve ---")?;
            for point in &self.equity_curve {
                writeln!(f, "{:<12} {:>14.2}", point.date.format("%b %d, %Y").to_string(), point.equity)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "--- Recent Daily P&L ---")?;
        for d in &self.recent_daily {
            writeln!(f, "{:<8} {:>14.2}", d.date.format("%b %d").to_string(), d.total)?;
        }
        writeln!(f, "{:=^60}", "")?;
        Ok(())
    }
}
