//! Immutable view of the journal handed to the aggregation layer.

use serde::{Deserialize, Serialize};

use super::{CapitalState, TradeEntry};

/// Everything the metrics functions need, fully materialized.
///
/// `capital` is `None` when no capital record exists at all, which is
/// different from a record holding zero initial capital.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalSnapshot {
    #[serde(default, rename = "trades")]
    pub entries: Vec<TradeEntry>,

    #[serde(default)]
    pub capital: Option<CapitalState>,
}

impl JournalSnapshot {
    pub fn new(entries: Vec<TradeEntry>, capital: Option<CapitalState>) -> Self {
        Self { entries, capital }
    }
}
