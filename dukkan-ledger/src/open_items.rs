//! Open-Item Ledger View Model
//!
//! Loads a party's open records, partitions them into debits and credits
//! sorted oldest-obligation-first (due date when present, else occurrence
//! date) to support FIFO-style manual matching, and computes the suggested
//! settlement amount for a selected debit/credit pair.
//!
//! Load failures degrade silently to an empty list — availability over
//! precision, the same policy the pricing lookup follows.

use std::sync::Arc;

use tracing::warn;

use dukkan_client::{RemoteStore, SETTLEMENT_CALL_TIMEOUT, with_timeout};
use shared::models::{Direction, OpenItem};

/// Suggested amount for a selected debit/credit pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettlementSuggestion {
    /// No suggestion possible (currency mismatch)
    None,
    /// Foreign-denominated suggestion (both items carry open foreign amounts)
    Foreign(f64),
    /// Base-denominated suggestion
    Base(f64),
}

/// A party's open items, partitioned for the matching UI
pub struct OpenItemsView {
    store: Arc<dyn RemoteStore>,
    party_id: Option<String>,
    currency_filter: Option<String>,
    debits: Vec<OpenItem>,
    credits: Vec<OpenItem>,
    /// One-shot guard: the automatic backfill fires at most once per party
    backfill_attempted: bool,
}

impl OpenItemsView {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            party_id: None,
            currency_filter: None,
            debits: Vec::new(),
            credits: Vec::new(),
            backfill_attempted: false,
        }
    }

    pub fn debits(&self) -> &[OpenItem] {
        &self.debits
    }

    pub fn credits(&self) -> &[OpenItem] {
        &self.credits
    }

    pub fn party_id(&self) -> Option<&str> {
        self.party_id.as_deref()
    }

    /// Restrict the working set to one currency; reload afterwards
    pub fn set_currency_filter(&mut self, currency: Option<String>) {
        self.currency_filter = currency;
    }

    /// Look up an item in the loaded working set by id
    pub fn find(&self, id: &str) -> Option<&OpenItem> {
        self.debits
            .iter()
            .chain(self.credits.iter())
            .find(|i| i.id == id)
    }

    /// Load the open items of a party.
    ///
    /// A zero-row first load triggers exactly one backfill/recompute call
    /// against the store before settling on the empty state.
    pub async fn load_party(&mut self, party_id: &str) {
        if self.party_id.as_deref() != Some(party_id) {
            self.party_id = Some(party_id.to_string());
            self.backfill_attempted = false;
        }

        let mut items = self.fetch(party_id).await;

        if items.is_empty() && !self.backfill_attempted {
            self.backfill_attempted = true;
            match self.store.backfill_party_open_items(party_id).await {
                Ok(result) if result.open_items_created > 0 => {
                    items = self.fetch(party_id).await;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(party_id, error = %err, "open-item backfill failed");
                }
            }
        }

        self.partition(items);
    }

    /// Reload the current party without touching the backfill guard
    pub async fn reload(&mut self) {
        let Some(party_id) = self.party_id.clone() else {
            return;
        };
        let items = self.fetch(&party_id).await;
        self.partition(items);
    }

    async fn fetch(&self, party_id: &str) -> Vec<OpenItem> {
        let call = self.store.list_party_open_items(
            party_id,
            self.currency_filter.as_deref(),
            None,
        );
        match with_timeout(SETTLEMENT_CALL_TIMEOUT, call).await {
            Ok(items) => items
                .into_iter()
                .filter(|i| i.open_base_amount > 0.0)
                .collect(),
            Err(err) => {
                warn!(party_id, error = %err, "open-item load failed, showing empty list");
                Vec::new()
            }
        }
    }

    fn partition(&mut self, items: Vec<OpenItem>) {
        let (mut debits, mut credits): (Vec<OpenItem>, Vec<OpenItem>) = items
            .into_iter()
            .partition(|i| i.direction == Direction::Debit);
        debits.sort_by_key(OpenItem::effective_date);
        credits.sort_by_key(OpenItem::effective_date);
        self.debits = debits;
        self.credits = credits;
    }

    /// Suggested amount for a `(debit, credit)` pair.
    ///
    /// Currencies must match; foreign-denominated when both sides carry an
    /// open foreign amount, base-denominated otherwise.
    pub fn suggest(debit: &OpenItem, credit: &OpenItem) -> SettlementSuggestion {
        if debit.currency_code != credit.currency_code {
            return SettlementSuggestion::None;
        }
        if let (Some(df), Some(cf)) = (debit.open_foreign_amount, credit.open_foreign_amount) {
            return SettlementSuggestion::Foreign(df.min(cf));
        }
        SettlementSuggestion::Base(debit.open_base_amount.min(credit.open_base_amount))
    }
}
