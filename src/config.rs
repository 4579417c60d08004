//! Journal configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default SQLite location, created on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./journal.db?mode=rwc";

/// Breakdown shown in the P&L section of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PnlView {
    #[default]
    Monthly,
    Daily,
}

impl std::fmt::Display for PnlView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PnlView::Monthly => f.write_str("monthly"),
            PnlView::Daily => f.write_str("daily"),
        }
    }
}

/// Configuration for storage and dashboard output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// sqlx connection string for the journal database
    pub database_url: String,

    /// Number of latest entries in the recent daily series
    pub recent_entries: usize,

    /// Default P&L breakdown for the dashboard
    pub pnl_view: PnlView,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            recent_entries: 30,
            pnl_view: PnlView::Monthly,
        }
    }
}
