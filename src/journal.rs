//! Journal service: validated writes against the store and snapshot-based
//! reads through the metrics layer.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::JournalConfig;
use crate::metrics::{CalendarMonth, Dashboard, YearMonth};
use crate::models::{
    parse_day, CapitalState, CapitalTransaction, JournalSnapshot, NewEntry, NewTransaction,
    TradeEntry, TransactionType,
};
use crate::store::JournalStore;

/// Trade record as found in a backup file. Ids are reassigned on import.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportedTrade {
    pub date: String,
    pub pnl: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Capital movement as found in a backup file.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportedTransaction {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedCapital {
    #[serde(default)]
    pub initial_capital: Decimal,
    #[serde(default)]
    pub transactions: Vec<ImportedTransaction>,
}

/// Backup file layout, compatible with `export` output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalBackup {
    #[serde(default)]
    pub trades: Vec<ImportedTrade>,
    #[serde(default)]
    pub capital: Option<ImportedCapital>,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub entries_added: usize,
    pub entries_skipped: usize,
    pub transactions_added: usize,
    pub transactions_skipped: usize,
    pub capital_replaced: bool,
}

/// Trading journal over a storage backend.
pub struct Journal<S> {
    store: S,
    config: JournalConfig,
}

impl<S: JournalStore> Journal<S> {
    pub fn new(store: S, config: JournalConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// Load entries and capital into one immutable snapshot.
    pub async fn snapshot(&self) -> Result<JournalSnapshot> {
        let entries = self.store.list_entries().await?;
        let capital = self.store.get_capital_state().await?;
        Ok(JournalSnapshot::new(entries, capital))
    }

    // ==================== Entries ====================

    /// Log a P&L entry for a day.
    pub async fn add_entry(
        &self,
        date: NaiveDate,
        pnl: Decimal,
        notes: Option<String>,
    ) -> Result<TradeEntry> {
        let entry = self.store.add_entry(NewEntry::new(date, pnl, notes)).await?;
        info!(id = %entry.id, date = %entry.date, pnl = %entry.pnl, "Entry added");
        Ok(entry)
    }

    /// Delete an entry. Returns `false` if the id is unknown.
    pub async fn delete_entry(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete_entry(id).await?;
        if removed {
            info!(id = %id, "Entry deleted");
        } else {
            warn!(id = %id, "No entry with this id");
        }
        Ok(removed)
    }

    // ==================== Capital ====================

    /// Set initial capital, creating the capital record if needed.
    pub async fn set_initial_capital(&self, amount: Decimal) -> Result<CapitalState> {
        let mut state = self.store.get_capital_state().await?.unwrap_or_default();
        state.set_initial_capital(amount)?;
        self.store.put_capital_state(&state).await?;

        info!(initial_capital = %amount, "Initial capital updated");
        Ok(state)
    }

    /// Append a deposit or withdrawal.
    pub async fn add_transaction(&self, transaction: NewTransaction) -> Result<CapitalTransaction> {
        let mut state = self.store.get_capital_state().await?.unwrap_or_default();

        let transaction = transaction.into_transaction(uuid::Uuid::new_v4().to_string());
        state.push_transaction(transaction.clone());
        self.store.put_capital_state(&state).await?;

        info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = %transaction.amount,
            date = %transaction.date,
            "Capital transaction added"
        );
        Ok(transaction)
    }

    /// Remove a capital transaction. Returns `false` if the id is unknown.
    pub async fn delete_transaction(&self, id: &str) -> Result<bool> {
        let Some(mut state) = self.store.get_capital_state().await? else {
            return Ok(false);
        };

        if !state.remove_transaction(id) {
            warn!(id = %id, "No capital transaction with this id");
            return Ok(false);
        }

        self.store.put_capital_state(&state).await?;
        info!(id = %id, "Capital transaction deleted");
        Ok(true)
    }

    // ==================== Views ====================

    pub async fn dashboard(&self) -> Result<Dashboard> {
        let snapshot = self.snapshot().await?;
        Ok(Dashboard::build(&snapshot, &self.config))
    }

    pub async fn calendar(&self, month: YearMonth, today: NaiveDate) -> Result<CalendarMonth> {
        let snapshot = self.snapshot().await?;
        Ok(CalendarMonth::build(&snapshot.entries, month, today))
    }

    // ==================== Backup ====================

    /// Append backup trades and replace capital if the backup carries it.
    ///
    /// Records with malformed dates or negative amounts are skipped. A
    /// negative initial capital fails the whole import before anything is
    /// written. Trades are added one at a time, so a store failure midway
    /// leaves the earlier ones in place; the error reports how many landed.
    pub async fn import(&self, backup: JournalBackup) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        let capital = backup
            .capital
            .map(|imported| {
                CapitalState::new(imported.initial_capital).map(|state| (state, imported.transactions))
            })
            .transpose()?;

        for trade in backup.trades {
            match parse_day(&trade.date) {
                Ok(date) => {
                    self.store
                        .add_entry(NewEntry::new(date, trade.pnl, trade.notes))
                        .await
                        .with_context(|| {
                            format!(
                                "Import stopped after {} entries were added",
                                summary.entries_added
                            )
                        })?;
                    summary.entries_added += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping imported trade");
                    summary.entries_skipped += 1;
                }
            }
        }

        if let Some((mut state, transactions)) = capital {
            for imported in transactions {
                let validated = parse_day(&imported.date).and_then(|date| {
                    NewTransaction::new(date, imported.kind, imported.amount, imported.notes)
                });
                match validated {
                    Ok(transaction) => {
                        state.push_transaction(
                            transaction.into_transaction(uuid::Uuid::new_v4().to_string()),
                        );
                        summary.transactions_added += 1;
                    }
                    Err(e) => {
                        warn!(error = %e, "Skipping imported capital transaction");
                        summary.transactions_skipped += 1;
                    }
                }
            }
            self.store
                .put_capital_state(&state)
                .await
                .with_context(|| {
                    format!(
                        "Import stopped after {} entries were added",
                        summary.entries_added
                    )
                })?;
            summary.capital_replaced = true;
        }

        info!(
            entries = summary.entries_added,
            transactions = summary.transactions_added,
            skipped = summary.entries_skipped + summary.transactions_skipped,
            "Import finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::JournalError;
    use anyhow::bail;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    async fn journal() -> Journal<Database> {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        Journal::new(db, JournalConfig::default())
    }

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    #[tokio::test]
    async fn test_empty_journal() {
        let journal = journal().await;
        let snapshot = journal.snapshot().await.unwrap();

        assert!(snapshot.entries.is_empty());
        assert!(snapshot.capital.is_none());
        let dashboard = journal.dashboard().await.unwrap();
        assert_eq!(dashboard.stats.total_pnl, Decimal::ZERO);
        assert_eq!(dashboard.stats.win_rate, Decimal::ZERO);
        assert!(dashboard.equity_curve.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one_entry() {
        let journal = journal().await;
        journal.add_entry(day("2024-01-01"), dec!(100), None).await.unwrap();
        let doomed = journal.add_entry(day("2024-01-02"), dec!(-35.5), None).await.unwrap();
        journal.add_entry(day("2024-01-02"), dec!(20), None).await.unwrap();

        let before = journal.dashboard().await.unwrap().stats;
        assert!(journal.delete_entry(&doomed.id).await.unwrap());
        let after_snapshot = journal.snapshot().await.unwrap();
        let after = journal.dashboard().await.unwrap().stats;

        assert_eq!(after.total_entries, before.total_entries - 1);
        assert_eq!(after.total_pnl, before.total_pnl - doomed.pnl);
        assert!(after_snapshot.entries.iter().all(|e| e.id != doomed.id));

        assert!(!journal.delete_entry("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_capital_flow_feeds_equity_curve() {
        let journal = journal().await;
        journal.set_initial_capital(dec!(1000)).await.unwrap();
        journal
            .add_transaction(
                NewTransaction::new(day("2024-01-05"), TransactionType::Deposit, dec!(500), None)
                    .unwrap(),
            )
            .await
            .unwrap();
        journal.add_entry(day("2024-01-05"), dec!(-100), None).await.unwrap();

        let dashboard = journal.dashboard().await.unwrap();
        assert_eq!(dashboard.equity_curve.len(), 1);
        assert_eq!(dashboard.equity_curve[0].date, day("2024-01-05"));
        assert_eq!(dashboard.equity_curve[0].equity, dec!(1400));
        assert_eq!(dashboard.stats.current_equity, dec!(1400));
    }

    #[tokio::test]
    async fn test_transaction_creates_capital_record() {
        let journal = journal().await;
        let tx = journal
            .add_transaction(
                NewTransaction::new(day("2024-02-01"), TransactionType::Withdrawal, dec!(50), None)
                    .unwrap(),
            )
            .await
            .unwrap();

        let capital = journal.snapshot().await.unwrap().capital.unwrap();
        assert_eq!(capital.initial_capital, Decimal::ZERO);
        assert_eq!(capital.current_capital(), dec!(-50));

        assert!(journal.delete_transaction(&tx.id).await.unwrap());
        assert!(!journal.delete_transaction(&tx.id).await.unwrap());
        let capital = journal.snapshot().await.unwrap().capital.unwrap();
        assert!(capital.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_negative_initial_capital_rejected() {
        let journal = journal().await;
        let err = journal.set_initial_capital(dec!(-1)).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<JournalError>(),
            Some(&JournalError::NegativeAmount(dec!(-1)))
        );
        assert!(journal.snapshot().await.unwrap().capital.is_none());
    }

    #[tokio::test]
    async fn test_import_skips_malformed_records() {
        let journal = journal().await;
        let backup: JournalBackup = serde_json::from_str(
            r#"{
                "trades": [
                    {"id": "abc", "date": "2024-01-01", "pnl": 100, "notes": ""},
                    {"date": "Jan 2", "pnl": 5},
                    {"date": "2024-01-03", "pnl": "-12.5"}
                ],
                "capital": {
                    "initialCapital": 2000,
                    "transactions": [
                        {"id": 1704412800000, "date": "2024-01-05", "type": "deposit", "amount": 500},
                        {"date": "2024-01-06", "type": "withdrawal", "amount": -5}
                    ]
                }
            }"#,
        )
        .unwrap();

        let summary = journal.import(backup).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                entries_added: 2,
                entries_skipped: 1,
                transactions_added: 1,
                transactions_skipped: 1,
                capital_replaced: true,
            }
        );

        let snapshot = journal.snapshot().await.unwrap();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.capital.map(|c| c.initial_capital), Some(dec!(2000)));
        let stats = journal.dashboard().await.unwrap().stats;
        assert_eq!(stats.current_equity, dec!(2587.5));
    }

    #[tokio::test]
    async fn test_import_rejects_negative_initial_capital() {
        let journal = journal().await;
        let backup: JournalBackup = serde_json::from_str(
            r#"{
                "trades": [{"date": "2024-01-01", "pnl": 100}],
                "capital": {"initialCapital": -500, "transactions": []}
            }"#,
        )
        .unwrap();

        let err = journal.import(backup).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<JournalError>(),
            Some(&JournalError::NegativeAmount(dec!(-500)))
        );

        let snapshot = journal.snapshot().await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.capital.is_none());
    }

    /// Keeps entries in memory and refuses writes past `limit`.
    struct LimitedStore {
        entries: Mutex<Vec<TradeEntry>>,
        limit: usize,
    }

    #[async_trait]
    impl JournalStore for LimitedStore {
        async fn list_entries(&self) -> Result<Vec<TradeEntry>> {
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn add_entry(&self, entry: NewEntry) -> Result<TradeEntry> {
            let mut entries = self.entries.lock().unwrap();
            if entries.len() >= self.limit {
                bail!("disk full");
            }
            let stored = TradeEntry {
                id: entries.len().to_string(),
                date: entry.date.format("%Y-%m-%d").to_string(),
                pnl: entry.pnl,
                notes: entry.notes,
                created_at: None,
            };
            entries.push(stored.clone());
            Ok(stored)
        }

        async fn delete_entry(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }

        async fn get_capital_state(&self) -> Result<Option<CapitalState>> {
            Ok(None)
        }

        async fn put_capital_state(&self, _state: &CapitalState) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_import_failure_reports_progress() {
        let store = LimitedStore {
            entries: Mutex::new(Vec::new()),
            limit: 2,
        };
        let journal = Journal::new(store, JournalConfig::default());
        let backup: JournalBackup = serde_json::from_str(
            r#"{"trades": [
                {"date": "2024-01-01", "pnl": 1},
                {"date": "2024-01-02", "pnl": 2},
                {"date": "2024-01-03", "pnl": 3}
            ]}"#,
        )
        .unwrap();

        let err = journal.import(backup).await.unwrap_err();
        assert_eq!(err.to_string(), "Import stopped after 2 entries were added");
        assert_eq!(format!("{:#}", err), "Import stopped after 2 entries were added: disk full");
        assert_eq!(journal.snapshot().await.unwrap().entries.len(), 2);
    }

    #[tokio::test]
    async fn test_calendar_uses_stored_entries() {
        let journal = journal().await;
        journal.add_entry(day("2024-02-05"), dec!(0), None).await.unwrap();

        let grid = journal
            .calendar("2024-02".parse().unwrap(), day("2024-02-05"))
            .await
            .unwrap();
        let fifth = grid.days().find(|d| d.date == day("2024-02-05")).unwrap();
        assert_eq!(fifth.pnl, Some(Decimal::ZERO));
        assert!(fifth.is_today);
        assert_eq!(grid.month_total, Decimal::ZERO);
    }
}
