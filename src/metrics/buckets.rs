//! Daily and monthly P&L buckets and their cumulative series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::TradeEntry;

use super::month::YearMonth;

/// Summed P&L for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// Summed P&L and entry count for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPnl {
    pub month: YearMonth,
    pub label: String,
    pub total: Decimal,
    pub count: u32,
}

/// Entries paired with their parsed day. Malformed dates are logged and
/// dropped so one bad record never blanks the whole series.
pub(crate) fn dated_entries<'a>(
    entries: &'a [TradeEntry],
) -> impl Iterator<Item = (NaiveDate, &'a TradeEntry)> + 'a {
    entries.iter().filter_map(|entry| match entry.day() {
        Ok(day) => Some((day, entry)),
        Err(e) => {
            warn!(id = %entry.id, date = %entry.date, error = %e, "Skipping entry with malformed date");
            None
        }
    })
}

/// Date → summed P&L as an ordered map.
pub fn pnl_by_day(entries: &[TradeEntry]) -> BTreeMap<NaiveDate, Decimal> {
    let mut by_day = BTreeMap::new();
    for (day, entry) in dated_entries(entries) {
        *by_day.entry(day).or_insert(Decimal::ZERO) += entry.pnl;
    }
    by_day
}

/// Sum entries per day, ascending by date.
pub fn daily_buckets(entries: &[TradeEntry]) -> Vec<DailyPnl> {
    pnl_by_day(entries)
        .into_iter()
        .map(|(date, total)| DailyPnl { date, total })
        .collect()
}

/// Sum entries per month with entry counts, ascending by month.
///
/// Months without entries are absent from the result.
pub fn monthly_buckets(entries: &[TradeEntry]) -> Vec<MonthlyPnl> {
    let mut by_month: BTreeMap<YearMonth, (Decimal, u32)> = BTreeMap::new();
    for (day, entry) in dated_entries(entries) {
        let bucket = by_month.entry(YearMonth::of(day)).or_insert((Decimal::ZERO, 0));
        bucket.0 += entry.pnl;
        bucket.1 += 1;
    }

    by_month
        .into_iter()
        .map(|(month, (total, count))| MonthlyPnl {
            month,
            label: month.label(),
            total,
            count,
        })
        .collect()
}

/// Daily buckets over the most recent `limit` entries only.
///
/// The window is taken over entries (latest dates first), then bucketed,
/// so it can cover fewer than `limit` distinct days.
pub fn recent_daily_buckets(entries: &[TradeEntry], limit: usize) -> Vec<DailyPnl> {
    let mut dated: Vec<_> = dated_entries(entries).collect();
    dated.sort_by_key(|(day, _)| *day);

    let skip = dated.len().saturating_sub(limit);
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for (day, entry) in dated.into_iter().skip(skip) {
        *by_day.entry(day).or_insert(Decimal::ZERO) += entry.pnl;
    }

    by_day
        .into_iter()
        .map(|(date, total)| DailyPnl { date, total })
        .collect()
}

/// Running sum over values whose order is already fixed.
pub fn cumulative(values: impl IntoIterator<Item = Decimal>) -> Vec<Decimal> {
    values
        .into_iter()
        .scan(Decimal::ZERO, |running, value| {
            *running += value;
            Some(*running)
        })
        .collect()
}
