//! Capital model: initial capital plus deposits and withdrawals.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::JournalError;

use super::entry::{normalize_notes, parse_day};

/// Direction of a capital movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" | "withdraw" => Ok(TransactionType::Withdrawal),
            other => Err(JournalError::UnknownTransactionType(other.to_string())),
        }
    }
}

/// A single deposit or withdrawal.
///
/// `amount` is an unsigned magnitude; the sign comes from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalTransaction {
    pub id: String,

    /// Calendar day (`YYYY-MM-DD`)
    pub date: String,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    pub amount: Decimal,

    #[serde(default)]
    pub notes: Option<String>,
}

impl CapitalTransaction {
    pub fn day(&self) -> Result<NaiveDate, JournalError> {
        parse_day(&self.date)
    }

    /// Amount with the sign implied by the transaction type.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Deposit => self.amount,
            TransactionType::Withdrawal => -self.amount,
        }
    }
}

/// A validated capital movement waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Build a transaction, rejecting negative magnitudes.
    pub fn new(
        date: NaiveDate,
        kind: TransactionType,
        amount: Decimal,
        notes: Option<String>,
    ) -> Result<Self, JournalError> {
        Ok(Self {
            date,
            kind,
            amount: non_negative(amount)?,
            notes: normalize_notes(notes),
        })
    }

    pub fn into_transaction(self, id: String) -> CapitalTransaction {
        CapitalTransaction {
            id,
            date: self.date.format("%Y-%m-%d").to_string(),
            kind: self.kind,
            amount: self.amount,
            notes: self.notes,
        }
    }
}

/// Capital amounts are magnitudes; direction comes from the transaction type.
fn non_negative(amount: Decimal) -> Result<Decimal, JournalError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(JournalError::NegativeAmount(amount));
    }
    Ok(amount)
}

/// The singleton capital record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalState {
    pub initial_capital: Decimal,

    /// Kept newest-first by date
    #[serde(default)]
    pub transactions: Vec<CapitalTransaction>,
}

impl CapitalState {
    /// A record with no transactions. Negative initial capital is rejected.
    pub fn new(initial_capital: Decimal) -> Result<Self, JournalError> {
        Ok(Self {
            initial_capital: non_negative(initial_capital)?,
            transactions: Vec::new(),
        })
    }

    /// Replace the starting balance, keeping the transactions.
    pub fn set_initial_capital(&mut self, amount: Decimal) -> Result<(), JournalError> {
        self.initial_capital = non_negative(amount)?;
        Ok(())
    }

    /// Net of all deposits and withdrawals.
    pub fn net_transactions(&self) -> Decimal {
        self.transactions.iter().map(|t| t.signed_amount()).sum()
    }

    /// Initial capital adjusted by every deposit and withdrawal.
    pub fn current_capital(&self) -> Decimal {
        self.initial_capital + self.net_transactions()
    }

    /// Insert a transaction and restore newest-first date order.
    pub fn push_transaction(&mut self, transaction: CapitalTransaction) {
        self.transactions.insert(0, transaction);
        // Stable sort keeps the fresh one ahead of older same-day records.
        self.transactions.sort_by(|a, b| b.date.cmp(&a.date));
    }

    /// Remove a transaction by id. Returns whether anything was removed.
    pub fn remove_transaction(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() != before
    }
}
