//! Trade entry model: one realized P&L figure logged for a calendar day.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::JournalError;

/// A logged P&L entry as held by the store.
///
/// `date` is kept in its stored text form. The aggregation layer parses it
/// and skips records that are not a valid `YYYY-MM-DD` day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEntry {
    /// Store-assigned identifier
    pub id: String,

    /// Calendar day of the entry (`YYYY-MM-DD`)
    pub date: String,

    /// Signed profit (positive) or loss (negative)
    pub pnl: Decimal,

    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,

    /// When the store recorded the entry
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TradeEntry {
    /// Parse the entry's date, rejecting anything other than `YYYY-MM-DD`.
    pub fn day(&self) -> Result<NaiveDate, JournalError> {
        parse_day(&self.date)
    }

    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < Decimal::ZERO
    }
}

/// A validated entry waiting to be written. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub pnl: Decimal,
    pub notes: Option<String>,
}

impl NewEntry {
    pub fn new(date: NaiveDate, pnl: Decimal, notes: Option<String>) -> Self {
        Self {
            date,
            pnl,
            notes: normalize_notes(notes),
        }
    }
}

/// Parse a strict ISO calendar day.
///
/// Only the zero-padded `YYYY-MM-DD` shape is accepted, so the text form of
/// every accepted date sorts in chronological order.
pub fn parse_day(raw: &str) -> Result<NaiveDate, JournalError> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !well_formed {
        return Err(JournalError::InvalidDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| JournalError::InvalidDate(raw.to_string()))
}

/// Blank notes are stored as absent.
pub(crate) fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
