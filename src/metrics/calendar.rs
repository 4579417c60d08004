//! Month calendar grid with per-day P&L.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TradeEntry;

use super::buckets::pnl_by_day;
use super::month::YearMonth;

/// Column headers, weeks start on Sunday.
pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// How a day with data is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Profit,
    Loss,
    NoData,
}

/// One real day in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,

    /// Summed P&L, or `None` when nothing was logged (distinct from zero)
    pub pnl: Option<Decimal>,

    pub is_today: bool,
}

impl CalendarDay {
    pub fn status(&self) -> DayStatus {
        match self.pnl {
            None => DayStatus::NoData,
            Some(pnl) if pnl >= Decimal::ZERO => DayStatus::Profit,
            Some(_) => DayStatus::Loss,
        }
    }
}

/// A grid slot: either a leading blank or a day of the month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
    Blank,
    Day(CalendarDay),
}

/// A rendered month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month: YearMonth,
    pub label: String,

    /// Leading blanks followed by every day of the month
    pub cells: Vec<CalendarCell>,

    /// Sum over days with data
    pub month_total: Decimal,
}

impl CalendarMonth {
    /// Lay out `month` with the P&L of each day attached.
    pub fn build(entries: &[TradeEntry], month: YearMonth, today: NaiveDate) -> Self {
        let by_day = pnl_by_day(entries);

        let offset = month.first_day().weekday().num_days_from_sunday() as usize;
        let mut cells = vec![CalendarCell::Blank; offset];
        let mut month_total = Decimal::ZERO;

        for date in month.days() {
            let pnl = by_day.get(&date).copied();
            if let Some(pnl) = pnl {
                month_total += pnl;
            }
            cells.push(CalendarCell::Day(CalendarDay {
                date,
                pnl,
                is_today: date == today,
            }));
        }

        Self {
            month,
            label: month.first_day().format("%B %Y").to_string(),
            cells,
            month_total,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.cells.iter().filter_map(|c| match c {
            CalendarCell::Day(day) => Some(day),
            CalendarCell::Blank => None,
        })
    }

    /// Cells chunked into Sunday-first weeks.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(WEEKDAYS.len())
    }
}
