//! Settlement Allocator
//!
//! Accumulates allocation drafts between a party's debit and credit open
//! items. Every check here is ADVISORY: it keeps the user from drafting
//! obviously impossible allocations, but the remote store re-validates the
//! whole batch authoritatively inside the atomic create-settlement call —
//! a concurrent user may have consumed an open balance in the meantime.

use rust_decimal::Decimal;

use shared::error::{AppError, ErrorCode};
use shared::locale::{Lang, localized};
use shared::models::{AllocationAmount, AllocationDraft, Direction, OpenItem};
use shared::money::to_decimal;
use shared::util::snowflake_id;

/// Which layer produced a validation outcome.
///
/// Client-side checks are [`Advisory`](Self::Advisory) UX only; the remote
/// call is the sole correctness boundary and its rejections are
/// [`Authoritative`](Self::Authoritative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationAuthority {
    Advisory,
    Authoritative,
}

impl ValidationAuthority {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advisory => "advisory",
            Self::Authoritative => "authoritative",
        }
    }
}

/// In-memory allocation draft list
#[derive(Debug)]
pub struct SettlementAllocator {
    lang: Lang,
    drafts: Vec<AllocationDraft>,
}

impl SettlementAllocator {
    pub fn new(lang: Lang) -> Self {
        Self {
            lang,
            drafts: Vec::new(),
        }
    }

    pub fn drafts(&self) -> &[AllocationDraft] {
        &self.drafts
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Take the draft list for submission (cleared on success by the caller)
    pub fn take_drafts(&mut self) -> Vec<AllocationDraft> {
        std::mem::take(&mut self.drafts)
    }

    pub fn restore_drafts(&mut self, drafts: Vec<AllocationDraft>) {
        self.drafts = drafts;
    }

    /// Remaining open amount of an item in the given dimension, net of the
    /// amounts already drafted against it. An item without a foreign
    /// amount has nothing remaining in the foreign dimension.
    pub fn remaining_open(&self, item: &OpenItem, foreign: bool) -> f64 {
        let open = if foreign {
            match item.open_foreign_amount {
                Some(v) => to_decimal(v),
                None => return 0.0,
            }
        } else {
            to_decimal(item.open_base_amount)
        };

        let drafted: Decimal = self
            .drafts
            .iter()
            .filter(|d| d.from_open_item_id == item.id || d.to_open_item_id == item.id)
            .filter_map(|d| match (foreign, d.amount) {
                (true, AllocationAmount::Foreign(v)) => Some(to_decimal(v)),
                (false, AllocationAmount::Base(v)) => Some(to_decimal(v)),
                _ => None,
            })
            .sum();

        shared::money::to_f64(open - drafted)
    }

    /// Propose an allocation between a debit and a credit item.
    ///
    /// Rejects with a localized error (no throw, list unchanged) on:
    /// direction mix-up, currency mismatch, non-positive amount, or an
    /// amount above either item's remaining open amount in the chosen
    /// dimension.
    pub fn add_allocation(
        &mut self,
        debit: &OpenItem,
        credit: &OpenItem,
        amount: AllocationAmount,
    ) -> Result<(), AppError> {
        if debit.direction != Direction::Debit || credit.direction != Direction::Credit {
            return Err(self.advisory(ErrorCode::OpenItemPairRequired));
        }
        if debit.currency_code != credit.currency_code {
            return Err(self.advisory(ErrorCode::CurrencyMismatch));
        }
        if amount.value() <= 0.0 {
            return Err(self.advisory(ErrorCode::AmountNotPositive));
        }

        let foreign = matches!(amount, AllocationAmount::Foreign(_));
        let available = self
            .remaining_open(debit, foreign)
            .min(self.remaining_open(credit, foreign));
        if amount.value() > available {
            return Err(self
                .advisory(ErrorCode::AmountExceedsOpen)
                .with_detail("available", available));
        }

        self.drafts.push(AllocationDraft {
            id: snowflake_id(),
            from_open_item_id: debit.id.clone(),
            to_open_item_id: credit.id.clone(),
            amount,
        });
        Ok(())
    }

    /// Prune one draft from the working list
    pub fn remove_allocation(&mut self, draft_id: i64) {
        self.drafts.retain(|d| d.id != draft_id);
    }

    /// Discard the whole working list
    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    fn advisory(&self, code: ErrorCode) -> AppError {
        AppError::with_message(code, localized(code, self.lang))
            .with_detail("authority", ValidationAuthority::Advisory.name())
    }
}
