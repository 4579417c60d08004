//! SQLite persistence for journal entries and the capital record.
//!
//! Tables:
//! - `trades`: one row per P&L entry
//! - `capital_state`: singleton row holding initial capital
//! - `capital_transactions`: deposits and withdrawals, in record order
//!
//! Money values are stored as TEXT so decimals round-trip exactly.

use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{debug, warn};

use crate::error::JournalError;
use crate::models::{CapitalState, CapitalTransaction, NewEntry, TradeEntry, TransactionType};
use crate::store::JournalStore;

/// Database connection pool for the journal.
pub struct Database {
    pool: SqlitePool,
}

/// Stored trade entry row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredEntry {
    pub id: String,
    pub date: String,
    pub pnl: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stored capital transaction row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredTransaction {
    pub id: String,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub notes: Option<String>,
}

impl TryFrom<StoredEntry> for TradeEntry {
    type Error = JournalError;

    fn try_from(row: StoredEntry) -> Result<Self, Self::Error> {
        Ok(TradeEntry {
            pnl: parse_decimal("trades.pnl", &row.pnl)?,
            id: row.id,
            date: row.date,
            notes: row.notes,
            created_at: Some(row.created_at),
        })
    }
}

impl TryFrom<StoredTransaction> for CapitalTransaction {
    type Error = JournalError;

    fn try_from(row: StoredTransaction) -> Result<Self, Self::Error> {
        Ok(CapitalTransaction {
            kind: TransactionType::from_str(&row.kind)?,
            amount: parse_decimal("capital_transactions.amount", &row.amount)?,
            id: row.id,
            date: row.date,
            notes: row.notes,
        })
    }
}

fn parse_decimal(column: &'static str, value: &str) -> Result<Decimal, JournalError> {
    Decimal::from_str(value).map_err(|_| JournalError::InvalidDecimal {
        column,
        value: value.to_string(),
    })
}

impl Database {
    /// Create a new database connection.
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::connect(database_url, 5).await
    }

    /// Connect with an explicit pool size. In-memory databases need a
    /// single connection, since each connection gets its own database.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run all database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                pnl TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS capital_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                initial_capital TEXT NOT NULL DEFAULT '0',
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS capital_transactions (
                id TEXT PRIMARY KEY,
                seq INTEGER NOT NULL,
                date TEXT NOT NULL,
                kind TEXT NOT NULL,
                amount TEXT NOT NULL,
                notes TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_trades_date ON trades(date)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ==================== Entries ====================

    /// Get all entries, newest date first.
    pub async fn get_entries(&self) -> Result<Vec<TradeEntry>> {
        let rows = sqlx::query_as::<_, StoredEntry>(
            "SELECT id, date, pnl, notes, created_at FROM trades ORDER BY date DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch entries")?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                TradeEntry::try_from(row)
                    .map_err(|e| warn!(id = %id, error = %e, "Skipping unreadable entry"))
                    .ok()
            })
            .collect())
    }

    /// Insert a new entry with a generated id.
    pub async fn insert_entry(&self, entry: NewEntry) -> Result<TradeEntry> {
        let stored = TradeEntry {
            id: uuid::Uuid::new_v4().to_string(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            pnl: entry.pnl,
            notes: entry.notes,
            created_at: Some(Utc::now()),
        };

        sqlx::query("INSERT INTO trades (id, date, pnl, notes, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&stored.id)
            .bind(&stored.date)
            .bind(stored.pnl.to_string())
            .bind(&stored.notes)
            .bind(stored.created_at)
            .execute(&self.pool)
            .await
            .context("Failed to insert entry")?;

        debug!(id = %stored.id, date = %stored.date, pnl = %stored.pnl, "Entry stored");
        Ok(stored)
    }

    /// Delete an entry by id.
    pub async fn remove_entry(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trades WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== Capital ====================

    /// Load the capital record with its transactions.
    pub async fn load_capital(&self) -> Result<Option<CapitalState>> {
        let initial: Option<(String,)> =
            sqlx::query_as("SELECT initial_capital FROM capital_state WHERE id = 1")
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch capital state")?;

        let Some((initial,)) = initial else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, StoredTransaction>(
            "SELECT id, date, kind, amount, notes FROM capital_transactions ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch capital transactions")?;

        let transactions = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                CapitalTransaction::try_from(row)
                    .map_err(|e| warn!(id = %id, error = %e, "Skipping unreadable capital transaction"))
                    .ok()
            })
            .collect();

        Ok(Some(CapitalState {
            initial_capital: parse_decimal("capital_state.initial_capital", &initial)?,
            transactions,
        }))
    }

    /// Replace the capital record in one transaction.
    pub async fn save_capital(&self, state: &CapitalState) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO capital_state (id, initial_capital, updated_at)
            VALUES (1, ?, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                initial_capital = excluded.initial_capital,
                updated_at = datetime('now')
            "#,
        )
        .bind(state.initial_capital.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM capital_transactions")
            .execute(&mut *tx)
            .await?;

        for (seq, transaction) in state.transactions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO capital_transactions (id, seq, date, kind, amount, notes)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&transaction.id)
            .bind(seq as i64)
            .bind(&transaction.date)
            .bind(transaction.kind.as_str())
            .bind(transaction.amount.to_string())
            .bind(&transaction.notes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.context("Failed to save capital state")?;

        debug!(
            initial_capital = %state.initial_capital,
            transactions = state.transactions.len(),
            "Capital state saved"
        );
        Ok(())
    }
}

#[async_trait]
impl JournalStore for Database {
    async fn list_entries(&self) -> Result<Vec<TradeEntry>> {
        self.get_entries().await
    }

    async fn add_entry(&self, entry: NewEntry) -> Result<TradeEntry> {
        self.insert_entry(entry).await
    }

    async fn delete_entry(&self, id: &str) -> Result<bool> {
        self.remove_entry(id).await
    }

    async fn get_capital_state(&self) -> Result<Option<CapitalState>> {
        self.load_capital().await
    }

    async fn put_capital_state(&self, state: &CapitalState) -> Result<()> {
        self.save_capital(state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tokio_test::assert_ok;

    async fn memory_db() -> Database {
        Database::connect("sqlite::memory:", 1).await.unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_entries_round_trip_newest_first() {
        let db = memory_db().await;

        let older = db
            .add_entry(NewEntry::new(day(2024, 1, 2), dec!(12.34), Some("scalp".to_string())))
            .await
            .unwrap();
        let newer = db
            .add_entry(NewEntry::new(day(2024, 3, 9), dec!(-0.10), None))
            .await
            .unwrap();

        let entries = db.list_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, newer.id);
        assert_eq!(entries[0].pnl, dec!(-0.10));
        assert_eq!(entries[1].id, older.id);
        assert_eq!(entries[1].date, "2024-01-02");
        assert_eq!(entries[1].notes.as_deref(), Some("scalp"));
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let db = memory_db().await;
        let entry = db
            .add_entry(NewEntry::new(day(2024, 1, 2), dec!(5), None))
            .await
            .unwrap();

        assert!(db.delete_entry(&entry.id).await.unwrap());
        assert!(!db.delete_entry(&entry.id).await.unwrap());
        assert!(db.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capital_absent_until_saved() {
        let db = memory_db().await;
        assert_eq!(db.get_capital_state().await.unwrap(), None);

        let state = CapitalState {
            initial_capital: dec!(1000.50),
            transactions: vec![
                CapitalTransaction {
                    id: "b".to_string(),
                    date: "2024-02-01".to_string(),
                    kind: TransactionType::Withdrawal,
                    amount: dec!(100),
                    notes: None,
                },
                CapitalTransaction {
                    id: "a".to_string(),
                    date: "2024-01-01".to_string(),
                    kind: TransactionType::Deposit,
                    amount: dec!(250.25),
                    notes: Some("bonus".to_string()),
                },
            ],
        };
        assert_ok!(db.put_capital_state(&state).await);

        assert_eq!(db.get_capital_state().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_capital_put_replaces_whole_record() {
        let db = memory_db().await;
        let mut state = CapitalState::new(dec!(100)).unwrap();
        state.transactions.push(CapitalTransaction {
            id: "x".to_string(),
            date: "2024-01-01".to_string(),
            kind: TransactionType::Deposit,
            amount: dec!(1),
            notes: None,
        });
        assert_ok!(db.put_capital_state(&state).await);

        let replacement = CapitalState::new(dec!(0)).unwrap();
        assert_ok!(db.put_capital_state(&replacement).await);

        let loaded = db.get_capital_state().await.unwrap().unwrap();
        assert_eq!(loaded.initial_capital, Decimal::ZERO);
        assert!(loaded.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_rows_skipped() {
        let db = memory_db().await;
        db.add_entry(NewEntry::new(day(2024, 1, 2), dec!(5), None))
            .await
            .unwrap();
        sqlx::query("INSERT INTO trades (id, date, pnl, notes, created_at) VALUES ('bad', '2024-01-03', 'n/a', NULL, ?)")
            .bind(Utc::now())
            .execute(&db.pool)
            .await
            .unwrap();

        let entries = db.list_entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pnl, dec!(5));
    }
}
