//! Settlement Workspace
//!
//! Ties the open-item view and the allocation drafts to the atomic
//! settlement calls. All workspace store calls run under the client-side
//! watchdog so a silent backend is reported as a timeout, distinct from a
//! backend rejection; neither is retried automatically.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use dukkan_client::{RemoteStore, SETTLEMENT_CALL_TIMEOUT, StoreError, with_timeout};
use shared::error::{AppError, ErrorCode};
use shared::locale::{Lang, localized};
use shared::models::{Settlement, SettlementCreate};
use shared::notify::Notifier;

use crate::allocator::{SettlementAllocator, ValidationAuthority};
use crate::open_items::OpenItemsView;

/// The settlement workspace for one selected party
pub struct SettlementWorkspace {
    store: Arc<dyn RemoteStore>,
    notifier: Arc<Notifier>,
    lang: Lang,
    pub open_items: OpenItemsView,
    pub allocator: SettlementAllocator,
    recent: Vec<Settlement>,
    party_id: Option<String>,
}

impl SettlementWorkspace {
    pub fn new(store: Arc<dyn RemoteStore>, notifier: Arc<Notifier>, lang: Lang) -> Self {
        Self {
            open_items: OpenItemsView::new(store.clone()),
            allocator: SettlementAllocator::new(lang),
            store,
            notifier,
            lang,
            recent: Vec::new(),
            party_id: None,
        }
    }

    pub fn recent_settlements(&self) -> &[Settlement] {
        &self.recent
    }

    /// Convenience capability probe for the surrounding UI
    pub async fn can(&self, capability: &str) -> bool {
        self.store.has_permission(capability).await.unwrap_or(false)
    }

    /// Switch the workspace to a party: drops drafts, loads open items and
    /// the recent-settlements list
    pub async fn select_party(&mut self, party_id: &str) {
        self.party_id = Some(party_id.to_string());
        self.allocator.clear();
        self.open_items.load_party(party_id).await;
        self.reload_recent().await;
    }

    /// Submit the whole draft list as one atomic settlement.
    ///
    /// On success the drafts are cleared and both lists reload. On
    /// rejection the drafts stay untouched so the user can adjust and
    /// retry; partial application cannot happen because the call is
    /// atomic-or-nothing on the store side.
    pub async fn create_settlement(
        &mut self,
        settlement_date: NaiveDate,
        notes: Option<String>,
    ) -> Result<String, AppError> {
        let Some(party_id) = self.party_id.clone() else {
            return Err(AppError::invalid_request("no party selected"));
        };
        if self.allocator.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::SettlementEmpty,
                localized(ErrorCode::SettlementEmpty, self.lang),
            ));
        }

        let request = SettlementCreate {
            party_id: party_id.clone(),
            settlement_date,
            allocations: self.allocator.drafts().to_vec(),
            notes,
        };

        let call = self.store.create_settlement(&request);
        match with_timeout(SETTLEMENT_CALL_TIMEOUT, call).await {
            Ok(settlement_id) => {
                info!(%party_id, %settlement_id, "settlement created");
                self.allocator.clear();
                self.open_items.reload().await;
                self.reload_recent().await;
                self.notifier.success(match self.lang {
                    Lang::Ar => "تم إنشاء التسوية بنجاح",
                    Lang::En => "Settlement created",
                });
                Ok(settlement_id)
            }
            Err(err) => Err(self.surface_store_error(err, ErrorCode::SettlementRejected)),
        }
    }

    /// Void a committed settlement. The reason is mandatory (collected by
    /// the surrounding UI) but not validated beyond non-empty.
    pub async fn reverse_settlement(
        &mut self,
        settlement_id: &str,
        reason: &str,
    ) -> Result<(), AppError> {
        if reason.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::ReasonRequired,
                localized(ErrorCode::ReasonRequired, self.lang),
            ));
        }

        let call = self.store.void_settlement(settlement_id, reason.trim());
        match with_timeout(SETTLEMENT_CALL_TIMEOUT, call).await {
            Ok(()) => {
                info!(settlement_id, "settlement voided");
                self.open_items.reload().await;
                self.reload_recent().await;
                Ok(())
            }
            Err(err) => Err(self.surface_store_error(err, ErrorCode::SettlementRejected)),
        }
    }

    /// Server-side FIFO auto-match for the selected party
    pub async fn auto_settle(&mut self) -> Result<Option<String>, AppError> {
        let Some(party_id) = self.party_id.clone() else {
            return Err(AppError::invalid_request("no party selected"));
        };

        let call = self.store.auto_settle_party_items(&party_id);
        match with_timeout(SETTLEMENT_CALL_TIMEOUT, call).await {
            Ok(result) => {
                if result.is_some() {
                    self.open_items.reload().await;
                    self.reload_recent().await;
                }
                Ok(result)
            }
            Err(err) => Err(self.surface_store_error(err, ErrorCode::SettlementRejected)),
        }
    }

    async fn reload_recent(&mut self) {
        let Some(party_id) = self.party_id.clone() else {
            return;
        };
        let call = self.store.list_party_settlements(&party_id);
        match with_timeout(SETTLEMENT_CALL_TIMEOUT, call).await {
            Ok(settlements) => self.recent = settlements,
            Err(err) => {
                warn!(%party_id, error = %err, "recent settlements load failed");
                self.recent = Vec::new();
            }
        }
    }

    /// Authoritative store failure: surface the localized message, tag the
    /// authority, pick the timeout code when the watchdog fired
    fn surface_store_error(&self, err: StoreError, rejected_code: ErrorCode) -> AppError {
        let message = err.surface(self.lang);
        self.notifier.error(message.clone());
        let code = match err {
            StoreError::Timeout => ErrorCode::TimeoutError,
            _ => rejected_code,
        };
        AppError::with_message(code, message)
            .with_detail("authority", ValidationAuthority::Authoritative.name())
    }
}
