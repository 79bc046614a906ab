//! Party Model

use serde::{Deserialize, Serialize};

use crate::locale::LocalizedText;

/// Party kind enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyKind {
    Customer,
    Supplier,
    Employee,
    Other,
}

/// Financial counterparty in the ledger subsystem (طرف مالي)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: LocalizedText,
    pub kind: PartyKind,
    pub is_active: bool,
}
