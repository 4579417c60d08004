//! Storage seam between the journal service and its persistence backend.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CapitalState, NewEntry, TradeEntry};

/// Persistence operations the journal relies on.
///
/// Entries are append/delete only. The capital record is read and replaced
/// as a whole.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// All entries, newest date first.
    async fn list_entries(&self) -> Result<Vec<TradeEntry>>;

    /// Persist an entry under a fresh id and return the stored record.
    async fn add_entry(&self, entry: NewEntry) -> Result<TradeEntry>;

    /// Delete by id. Returns `false` when no such entry exists.
    async fn delete_entry(&self, id: &str) -> Result<bool>;

    /// The capital record, or `None` if capital was never set up.
    async fn get_capital_state(&self) -> Result<Option<CapitalState>>;

    /// Replace the capital record and its transactions atomically.
    async fn put_capital_state(&self, state: &CapitalState) -> Result<()>;
}
