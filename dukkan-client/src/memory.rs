//! In-process remote store
//!
//! A `RemoteStore` backed by in-memory tables, used by tests and demos the
//! way a local edge deployment would be. Settlement creation re-validates
//! allocations against open amounts, mirroring the authoritative check the
//! real store performs — client-side draft validation stays advisory.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::store::{BackfillResult, RemoteStore};
use shared::models::{
    AllocationAmount, DeliveryZone, OpenItem, OpenItemStatus, OrderDraft, OrderReceipt, Settlement,
    SettlementCreate, SettlementStatus,
};
use shared::util::now_millis;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Tables {
    prices: HashMap<String, f64>,
    discounts: HashMap<String, f64>,
    zones: Vec<DeliveryZone>,
    open_items: Vec<OpenItem>,
    backfill_items: Vec<OpenItem>,
    settlements: Vec<Settlement>,
    submitted_orders: Vec<OrderDraft>,
    created_settlements: Vec<SettlementCreate>,
    voided: Vec<(String, String)>,
    denied_capabilities: Vec<String>,
    reject_orders: Option<String>,
    reject_settlements: Option<String>,
    auto_settle_result: Option<String>,
    call_delay: Option<Duration>,
}

/// In-memory [`RemoteStore`] implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_pricing: AtomicBool,
    backfill_calls: AtomicU32,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Seeding ==========

    pub fn set_price(&self, item_id: &str, unit_price: f64) {
        self.lock().prices.insert(item_id.to_string(), unit_price);
    }

    pub fn set_discount(&self, item_id: &str, percent: f64) {
        self.lock().discounts.insert(item_id.to_string(), percent);
    }

    pub fn set_zones(&self, zones: Vec<DeliveryZone>) {
        self.lock().zones = zones;
    }

    pub fn set_open_items(&self, items: Vec<OpenItem>) {
        self.lock().open_items = items;
    }

    /// Items that appear only after a backfill call (recomputed from journals)
    pub fn set_backfill_items(&self, items: Vec<OpenItem>) {
        self.lock().backfill_items = items;
    }

    pub fn deny_capability(&self, capability: &str) {
        self.lock().denied_capabilities.push(capability.to_string());
    }

    // ========== Failure injection ==========

    pub fn fail_pricing(&self, fail: bool) {
        self.fail_pricing.store(fail, Ordering::SeqCst);
    }

    pub fn reject_orders(&self, message: impl Into<String>) {
        self.lock().reject_orders = Some(message.into());
    }

    pub fn reject_orders_clear(&self) {
        self.lock().reject_orders = None;
    }

    pub fn reject_settlements(&self, message: impl Into<String>) {
        self.lock().reject_settlements = Some(message.into());
    }

    pub fn reject_settlements_clear(&self) {
        self.lock().reject_settlements = None;
    }

    pub fn set_auto_settle_result(&self, settlement_id: Option<String>) {
        self.lock().auto_settle_result = settlement_id;
    }

    /// Delay every call (watchdog tests)
    pub fn set_call_delay(&self, delay: Duration) {
        self.lock().call_delay = Some(delay);
    }

    // ========== Inspection ==========

    pub fn submitted_orders(&self) -> Vec<OrderDraft> {
        self.lock().submitted_orders.clone()
    }

    pub fn created_settlements(&self) -> Vec<SettlementCreate> {
        self.lock().created_settlements.clone()
    }

    pub fn voided_settlements(&self) -> Vec<(String, String)> {
        self.lock().voided.clone()
    }

    pub fn backfill_call_count(&self) -> u32 {
        self.backfill_calls.load(Ordering::SeqCst)
    }

    pub fn open_items(&self) -> Vec<OpenItem> {
        self.lock().open_items.clone()
    }

    // ========== Internals ==========

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", prefix, n)
    }

    async fn simulate_latency(&self) {
        let delay = self.lock().call_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Authoritative re-validation: every allocation must fit both items'
    /// remaining open amounts in its dimension.
    fn apply_allocations(tables: &mut Tables, req: &SettlementCreate) -> StoreResult<()> {
        for draft in &req.allocations {
            for item_id in [&draft.from_open_item_id, &draft.to_open_item_id] {
                let item = tables
                    .open_items
                    .iter_mut()
                    .find(|i| &i.id == item_id)
                    .ok_or_else(|| StoreError::Rejected("القيد غير موجود".to_string()))?;

                match draft.amount {
                    AllocationAmount::Base(v) => {
                        if v > item.open_base_amount {
                            return Err(StoreError::Rejected(
                                "الرصيد المفتوح غير كافٍ".to_string(),
                            ));
                        }
                        item.open_base_amount -= v;
                    }
                    AllocationAmount::Foreign(v) => {
                        let open = item.open_foreign_amount.ok_or_else(|| {
                            StoreError::Rejected("القيد بدون مبلغ أجنبي".to_string())
                        })?;
                        if v > open {
                            return Err(StoreError::Rejected(
                                "الرصيد المفتوح غير كافٍ".to_string(),
                            ));
                        }
                        item.open_foreign_amount = Some(open - v);
                    }
                }
                if item.open_base_amount <= 0.0 {
                    item.status = OpenItemStatus::Settled;
                } else if item.open_base_amount < item.base_amount {
                    item.status = OpenItemStatus::PartiallySettled;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get_item_price(
        &self,
        item_id: &str,
        _customer_id: Option<&str>,
        _quantity: f64,
    ) -> StoreResult<f64> {
        self.simulate_latency().await;
        if self.fail_pricing.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("pricing lookup unavailable".to_string()));
        }
        self.lock()
            .prices
            .get(item_id)
            .copied()
            .ok_or_else(|| StoreError::NotFound(item_id.to_string()))
    }

    async fn get_item_discount(
        &self,
        item_id: &str,
        _customer_id: Option<&str>,
        _quantity: f64,
    ) -> StoreResult<f64> {
        self.simulate_latency().await;
        if self.fail_pricing.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("pricing lookup unavailable".to_string()));
        }
        Ok(self.lock().discounts.get(item_id).copied().unwrap_or(0.0))
    }

    async fn list_delivery_zones(&self) -> StoreResult<Vec<DeliveryZone>> {
        self.simulate_latency().await;
        Ok(self.lock().zones.clone())
    }

    async fn create_order(&self, draft: &OrderDraft) -> StoreResult<OrderReceipt> {
        self.simulate_latency().await;
        let mut tables = self.lock();
        if let Some(message) = &tables.reject_orders {
            return Err(StoreError::Rejected(message.clone()));
        }
        tables.submitted_orders.push(draft.clone());
        drop(tables);
        Ok(OrderReceipt {
            id: self.next_id("ord"),
            created_at: now_millis(),
        })
    }

    async fn list_party_open_items(
        &self,
        party_id: &str,
        currency: Option<&str>,
        status: Option<OpenItemStatus>,
    ) -> StoreResult<Vec<OpenItem>> {
        self.simulate_latency().await;
        Ok(self
            .lock()
            .open_items
            .iter()
            .filter(|i| i.party_id == party_id)
            .filter(|i| currency.is_none_or(|c| i.currency_code == c))
            .filter(|i| status.is_none_or(|s| i.status == s))
            .cloned()
            .collect())
    }

    async fn backfill_party_open_items(&self, party_id: &str) -> StoreResult<BackfillResult> {
        self.simulate_latency().await;
        self.backfill_calls.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.lock();
        let created: Vec<OpenItem> = tables
            .backfill_items
            .drain(..)
            .filter(|i| i.party_id == party_id)
            .collect();
        let count = created.len() as i64;
        tables.open_items.extend(created);
        Ok(BackfillResult {
            open_items_created: count,
        })
    }

    async fn create_settlement(&self, req: &SettlementCreate) -> StoreResult<String> {
        self.simulate_latency().await;
        let mut tables = self.lock();
        if let Some(message) = &tables.reject_settlements {
            return Err(StoreError::Rejected(message.clone()));
        }
        if req.allocations.is_empty() {
            return Err(StoreError::Rejected("لا توجد تخصيصات".to_string()));
        }
        Self::apply_allocations(&mut tables, req)?;
        tables.created_settlements.push(req.clone());
        drop(tables);

        let id = self.next_id("stl");
        self.lock().settlements.push(Settlement {
            id: id.clone(),
            party_id: req.party_id.clone(),
            settlement_date: req.settlement_date,
            notes: req.notes.clone(),
            status: SettlementStatus::Posted,
            created_at: now_millis(),
        });
        Ok(id)
    }

    async fn void_settlement(&self, settlement_id: &str, reason: &str) -> StoreResult<()> {
        self.simulate_latency().await;
        let mut tables = self.lock();
        let settlement = tables
            .settlements
            .iter_mut()
            .find(|s| s.id == settlement_id)
            .ok_or_else(|| StoreError::NotFound(settlement_id.to_string()))?;
        settlement.status = SettlementStatus::Voided;
        tables.voided.push((settlement_id.to_string(), reason.to_string()));
        Ok(())
    }

    async fn auto_settle_party_items(&self, _party_id: &str) -> StoreResult<Option<String>> {
        self.simulate_latency().await;
        Ok(self.lock().auto_settle_result.clone())
    }

    async fn list_party_settlements(&self, party_id: &str) -> StoreResult<Vec<Settlement>> {
        self.simulate_latency().await;
        Ok(self
            .lock()
            .settlements
            .iter()
            .filter(|s| s.party_id == party_id)
            .cloned()
            .collect())
    }

    async fn has_permission(&self, capability: &str) -> StoreResult<bool> {
        self.simulate_latency().await;
        Ok(!self
            .lock()
            .denied_capabilities
            .iter()
            .any(|c| c == capability))
    }
}
