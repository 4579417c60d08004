//! Domain errors for journal input and stored records.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation failures for dates, months, amounts and stored values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),

    #[error("capital amount must be non-negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("unknown transaction type '{0}' (expected deposit or withdrawal)")]
    UnknownTransactionType(String),

    #[error("stored value '{value}' in column {column} is not a decimal")]
    InvalidDecimal { column: &'static str, value: String },
}
