//! Data models for trade entries, capital, and journal snapshots.

mod capital;
mod entry;
mod snapshot;

pub use capital::{CapitalState, CapitalTransaction, NewTransaction, TransactionType};
pub use entry::{parse_day, NewEntry, TradeEntry};
pub use snapshot::JournalSnapshot;
