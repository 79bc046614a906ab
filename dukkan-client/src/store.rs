//! Remote store contract
//!
//! The abstract remote-procedure surface the client core runs against.
//! Exact row schema is owned by the store; the client decodes at this
//! boundary and treats every business outcome (ledger postings, FIFO
//! matching, stock) as opaque.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use shared::models::{
    DeliveryZone, OpenItem, OpenItemStatus, OrderDraft, OrderReceipt, Settlement, SettlementCreate,
};

/// Result of a party open-item backfill/recompute
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackfillResult {
    pub open_items_created: i64,
}

/// Remote-procedure contracts consumed by the client core.
///
/// Every method is one independent asynchronous round-trip; balance-affecting
/// calls (`create_order`, `create_settlement`, `void_settlement`) are
/// atomic-or-nothing on the store side.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // ========== Pricing lookups ==========

    /// Per-item unit price for `(item, customer, quantity)`
    async fn get_item_price(
        &self,
        item_id: &str,
        customer_id: Option<&str>,
        quantity: f64,
    ) -> StoreResult<f64>;

    /// Per-item tier discount percent for `(item, customer, quantity)`
    async fn get_item_discount(
        &self,
        item_id: &str,
        customer_id: Option<&str>,
        quantity: f64,
    ) -> StoreResult<f64>;

    // ========== Zones ==========

    /// All configured delivery zones
    async fn list_delivery_zones(&self) -> StoreResult<Vec<DeliveryZone>>;

    // ========== Orders ==========

    /// Atomic order creation
    async fn create_order(&self, draft: &OrderDraft) -> StoreResult<OrderReceipt>;

    // ========== Open items ==========

    /// Open items for a party, optionally filtered by currency and status
    async fn list_party_open_items(
        &self,
        party_id: &str,
        currency: Option<&str>,
        status: Option<OpenItemStatus>,
    ) -> StoreResult<Vec<OpenItem>>;

    /// Recompute/backfill a party's open items from its journal lines
    async fn backfill_party_open_items(&self, party_id: &str) -> StoreResult<BackfillResult>;

    // ========== Settlements ==========

    /// Atomic settlement creation; returns the settlement id
    async fn create_settlement(&self, req: &SettlementCreate) -> StoreResult<String>;

    /// Void a committed settlement, restoring the allocated open amounts
    async fn void_settlement(&self, settlement_id: &str, reason: &str) -> StoreResult<()>;

    /// Server-side FIFO auto-match for a party; returns the settlement id
    /// when anything was matched
    async fn auto_settle_party_items(&self, party_id: &str) -> StoreResult<Option<String>>;

    /// Recent settlements for a party
    async fn list_party_settlements(&self, party_id: &str) -> StoreResult<Vec<Settlement>>;

    // ========== Permissions ==========

    /// Boolean capability check (authorization decisions stay server-side)
    async fn has_permission(&self, capability: &str) -> StoreResult<bool>;
}
