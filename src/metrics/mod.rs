//! Aggregation engine: pure functions from a journal snapshot to the series
//! shown on the dashboard and calendar.

mod buckets;
mod calendar;
mod equity;
mod month;
mod report;
mod summary;

pub use calendar::{CalendarCell, CalendarMonth, DayStatus, WEEKDAYS};
pub use month::YearMonth;
pub use report::Dashboard;
