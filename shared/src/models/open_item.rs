//! Open Item Model
//!
//! A single-currency financial record with a remaining balance, owned by
//! the remote ledger. The client only reads open items and proposes
//! allocations against them; open amounts decrease server-side as
//! settlements are committed, never in the client.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Debit/credit direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Debit,
    Credit,
}

/// Open item status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpenItemStatus {
    Open,
    PartiallySettled,
    Settled,
}

/// Open (unsettled) ledger record
///
/// Invariant (remote-enforced): `open_base_amount <= base_amount`, and when
/// a foreign amount is carried, `open_foreign_amount <= foreign_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenItem {
    pub id: String,
    pub party_id: String,
    pub journal_entry_id: String,
    pub journal_line_id: String,
    pub direction: Direction,
    pub occurred_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    /// ISO currency code ("YER", "USD", ...)
    pub currency_code: String,
    /// Original foreign-denominated amount, when the record is dual-amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_amount: Option<f64>,
    /// Original base-currency amount
    pub base_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_foreign_amount: Option<f64>,
    pub open_base_amount: f64,
    pub status: OpenItemStatus,
}

impl OpenItem {
    /// Sort key for FIFO-style manual matching: due date when present,
    /// else the occurrence date
    pub fn effective_date(&self) -> Timestamp {
        self.due_date.unwrap_or(self.occurred_at)
    }

    /// Whether the record carries a foreign-currency open amount
    pub fn has_open_foreign(&self) -> bool {
        self.open_foreign_amount.is_some()
    }
}
