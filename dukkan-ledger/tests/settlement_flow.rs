//! End-to-end settlement workspace flow against the in-process store

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use dukkan_client::memory::MemoryStore;
use dukkan_ledger::open_items::{OpenItemsView, SettlementSuggestion};
use dukkan_ledger::workspace::SettlementWorkspace;
use shared::error::ErrorCode;
use shared::locale::Lang;
use shared::models::{AllocationAmount, Direction, OpenItem, OpenItemStatus, SettlementStatus};
use shared::notify::Notifier;

fn open_item(
    id: &str,
    party: &str,
    direction: Direction,
    currency: &str,
    open_base: f64,
    open_foreign: Option<f64>,
    due_date: Option<i64>,
) -> OpenItem {
    OpenItem {
        id: id.to_string(),
        party_id: party.to_string(),
        journal_entry_id: format!("je-{}", id),
        journal_line_id: format!("jl-{}", id),
        direction,
        occurred_at: 1_000,
        due_date,
        currency_code: currency.to_string(),
        foreign_amount: open_foreign,
        base_amount: open_base,
        open_foreign_amount: open_foreign,
        open_base_amount: open_base,
        status: OpenItemStatus::Open,
    }
}

fn workspace(store: Arc<MemoryStore>) -> SettlementWorkspace {
    SettlementWorkspace::new(store, Arc::new(Notifier::new()), Lang::Ar)
}

fn settlement_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

#[tokio::test]
async fn full_settlement_round_trip() {
    let store = Arc::new(MemoryStore::new());
    store.set_open_items(vec![
        open_item("d1", "p1", Direction::Debit, "YER", 100.0, None, Some(5_000)),
        open_item("d2", "p1", Direction::Debit, "YER", 40.0, None, Some(2_000)),
        open_item("c1", "p1", Direction::Credit, "YER", 120.0, None, None),
    ]);

    let mut ws = workspace(store.clone());
    ws.select_party("p1").await;

    // Oldest obligation first: d2 (due 2000) before d1 (due 5000)
    let debit_ids: Vec<&str> = ws.open_items.debits().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(debit_ids, vec!["d2", "d1"]);

    // Suggestion for the selected pair is the base minimum
    let d1 = ws.open_items.find("d1").unwrap().clone();
    let c1 = ws.open_items.find("c1").unwrap().clone();
    assert_eq!(
        OpenItemsView::suggest(&d1, &c1),
        SettlementSuggestion::Base(100.0)
    );

    ws.allocator
        .add_allocation(&d1, &c1, AllocationAmount::Base(100.0))
        .unwrap();
    let d2 = ws.open_items.find("d2").unwrap().clone();
    let c1 = ws.open_items.find("c1").unwrap().clone();
    ws.allocator
        .add_allocation(&d2, &c1, AllocationAmount::Base(20.0))
        .unwrap();

    let settlement_id = ws
        .create_settlement(settlement_date(), Some("تسوية شهر يونيو".to_string()))
        .await
        .unwrap();
    assert!(!settlement_id.is_empty());

    // Drafts cleared, open items reloaded from the authoritative store
    assert!(ws.allocator.is_empty());
    let debit_ids: Vec<&str> = ws.open_items.debits().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(debit_ids, vec!["d2"]); // d1 fully settled, d2 has 20 left
    assert_eq!(ws.open_items.debits()[0].open_base_amount, 20.0);
    assert_eq!(ws.recent_settlements().len(), 1);
    assert_eq!(ws.recent_settlements()[0].status, SettlementStatus::Posted);
}

#[tokio::test]
async fn rejection_keeps_drafts_for_adjustment() {
    let store = Arc::new(MemoryStore::new());
    store.set_open_items(vec![
        open_item("d1", "p1", Direction::Debit, "YER", 100.0, None, None),
        open_item("c1", "p1", Direction::Credit, "YER", 100.0, None, None),
    ]);

    let mut ws = workspace(store.clone());
    ws.select_party("p1").await;

    let d1 = ws.open_items.find("d1").unwrap().clone();
    let c1 = ws.open_items.find("c1").unwrap().clone();
    ws.allocator
        .add_allocation(&d1, &c1, AllocationAmount::Base(100.0))
        .unwrap();

    // A concurrent user consumed the balance; the store says no
    store.reject_settlements("الرصيد المفتوح غير كافٍ");
    let err = ws
        .create_settlement(settlement_date(), None)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::SettlementRejected);
    assert_eq!(err.message, "الرصيد المفتوح غير كافٍ");
    assert_eq!(err.details.unwrap()["authority"], "authoritative");
    // Draft list untouched for a deliberate retry
    assert_eq!(ws.allocator.drafts().len(), 1);
    assert!(store.created_settlements().is_empty());

    store.reject_settlements_clear();
    ws.create_settlement(settlement_date(), None).await.unwrap();
    assert!(ws.allocator.is_empty());
}

#[tokio::test]
async fn empty_first_load_backfills_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    store.set_backfill_items(vec![open_item(
        "d1",
        "p1",
        Direction::Debit,
        "YER",
        75.0,
        None,
        None,
    )]);

    let mut ws = workspace(store.clone());
    ws.select_party("p1").await;

    assert_eq!(store.backfill_call_count(), 1);
    assert_eq!(ws.open_items.debits().len(), 1);

    // Loading the same party again must not re-trigger the backfill
    ws.open_items.load_party("p1").await;
    assert_eq!(store.backfill_call_count(), 1);
}

#[tokio::test]
async fn backfill_that_creates_nothing_settles_on_empty_state() {
    let store = Arc::new(MemoryStore::new());
    let mut ws = workspace(store.clone());
    ws.select_party("p1").await;

    assert_eq!(store.backfill_call_count(), 1);
    assert!(ws.open_items.debits().is_empty());
    assert!(ws.open_items.credits().is_empty());

    ws.open_items.load_party("p1").await;
    assert_eq!(store.backfill_call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn silent_backend_reports_a_timeout_not_a_rejection() {
    let store = Arc::new(MemoryStore::new());
    store.set_open_items(vec![
        open_item("d1", "p1", Direction::Debit, "YER", 100.0, None, None),
        open_item("c1", "p1", Direction::Credit, "YER", 100.0, None, None),
    ]);

    let mut ws = workspace(store.clone());
    ws.select_party("p1").await;

    let d1 = ws.open_items.find("d1").unwrap().clone();
    let c1 = ws.open_items.find("c1").unwrap().clone();
    ws.allocator
        .add_allocation(&d1, &c1, AllocationAmount::Base(50.0))
        .unwrap();

    // Backend stops answering: the 15 s watchdog fires first
    store.set_call_delay(Duration::from_secs(60));
    let err = ws
        .create_settlement(settlement_date(), None)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::TimeoutError);
    assert_eq!(ws.allocator.drafts().len(), 1);
}

#[tokio::test]
async fn reversal_requires_a_reason_then_voids_and_reloads() {
    let store = Arc::new(MemoryStore::new());
    store.set_open_items(vec![
        open_item("d1", "p1", Direction::Debit, "YER", 100.0, None, None),
        open_item("c1", "p1", Direction::Credit, "YER", 100.0, None, None),
    ]);

    let mut ws = workspace(store.clone());
    ws.select_party("p1").await;

    let d1 = ws.open_items.find("d1").unwrap().clone();
    let c1 = ws.open_items.find("c1").unwrap().clone();
    ws.allocator
        .add_allocation(&d1, &c1, AllocationAmount::Base(100.0))
        .unwrap();
    let settlement_id = ws.create_settlement(settlement_date(), None).await.unwrap();

    let err = ws.reverse_settlement(&settlement_id, "   ").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ReasonRequired);

    ws.reverse_settlement(&settlement_id, "قيد مكرر بالخطأ")
        .await
        .unwrap();
    assert_eq!(ws.recent_settlements()[0].status, SettlementStatus::Voided);
    assert_eq!(
        store.voided_settlements(),
        vec![(settlement_id, "قيد مكرر بالخطأ".to_string())]
    );
}

#[tokio::test]
async fn auto_settle_reloads_when_the_store_matched_something() {
    let store = Arc::new(MemoryStore::new());
    store.set_open_items(vec![open_item(
        "d1",
        "p1",
        Direction::Debit,
        "YER",
        100.0,
        None,
        None,
    )]);
    store.set_auto_settle_result(Some("stl-auto".to_string()));

    let mut ws = workspace(store.clone());
    ws.select_party("p1").await;

    let result = ws.auto_settle().await.unwrap();
    assert_eq!(result, Some("stl-auto".to_string()));
}

#[tokio::test]
async fn capability_probe_reflects_store_denials() {
    let store = Arc::new(MemoryStore::new());
    store.deny_capability("settlements:void");

    let ws = workspace(store);
    assert!(ws.can("settlements:create").await);
    assert!(!ws.can("settlements:void").await);
}
