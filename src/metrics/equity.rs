//! Equity curve combining capital movements with realized P&L.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{CapitalState, TradeEntry};

use super::buckets::dated_entries;

/// Account equity after all events of one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: Decimal,
}

#[derive(Debug, Default, Clone, Copy)]
struct DayFlows {
    capital: Decimal,
    pnl: Decimal,
}

/// Build the equity curve over every date with a trade or a capital movement.
///
/// Equity starts at the initial capital. For each date the day's deposits and
/// withdrawals are applied before the day's P&L. Without any capital record
/// the curve is empty; a record holding zero capital still yields a curve.
pub fn equity_curve(entries: &[TradeEntry], capital: Option<&CapitalState>) -> Vec<EquityPoint> {
    let Some(capital) = capital else {
        return Vec::new();
    };

    let mut flows: BTreeMap<NaiveDate, DayFlows> = BTreeMap::new();

    for transaction in &capital.transactions {
        match transaction.day() {
            Ok(day) => flows.entry(day).or_default().capital += transaction.signed_amount(),
            Err(e) => warn!(
                id = %transaction.id,
                date = %transaction.date,
                error = %e,
                "Skipping capital transaction with malformed date"
            ),
        }
    }

    for (day, entry) in dated_entries(entries) {
        flows.entry(day).or_default().pnl += entry.pnl;
    }

    let mut equity = capital.initial_capital;
    flows
        .into_iter()
        .map(|(date, day)| {
            equity += day.capital;
            equity += day.pnl;
            EquityPoint { date, equity }
        })
        .collect()
}

/// Flat account equity: capital plus every deposit, withdrawal and P&L.
///
/// Independent of dates, so malformed records still count here.
pub fn current_equity(entries: &[TradeEntry], capital: Option<&CapitalState>) -> Decimal {
    let capital = capital.map(|c| c.current_capital()).unwrap_or(Decimal::ZERO);
    let pnl: Decimal = entries.iter().map(|e| e.pnl).sum();
    capital + pnl
}
