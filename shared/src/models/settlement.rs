//! Settlement Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// The amount dimension an allocation is denominated in.
///
/// Exactly one of the two dimensions is carried per draft, mirroring the
/// dual-amount (foreign/base) open-item records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "dimension", content = "value")]
pub enum AllocationAmount {
    Foreign(f64),
    Base(f64),
}

impl AllocationAmount {
    pub fn value(&self) -> f64 {
        match self {
            AllocationAmount::Foreign(v) | AllocationAmount::Base(v) => *v,
        }
    }
}

/// Client-only allocation proposal between a debit and a credit open item.
///
/// Lives in the allocator's working set until submitted; discarded on
/// submission or explicit clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationDraft {
    pub id: i64,
    pub from_open_item_id: String,
    pub to_open_item_id: String,
    pub amount: AllocationAmount,
}

/// Atomic settlement creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementCreate {
    pub party_id: String,
    pub settlement_date: NaiveDate,
    pub allocations: Vec<AllocationDraft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Settlement status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Posted,
    Voided,
}

/// Committed settlement row (recent-settlements list)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: String,
    pub party_id: String,
    pub settlement_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: SettlementStatus,
    pub created_at: Timestamp,
}
