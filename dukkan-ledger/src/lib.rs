//! Dukkan Ledger - settlement workspace
//!
//! Open-item matching between a party's debit and credit records:
//! - [`open_items`]: loads and partitions a party's open items and computes
//!   the suggested settlement amount for a chosen pair
//! - [`allocator`]: accumulates allocation drafts under advisory validation
//! - [`workspace`]: ties both to the atomic create/void settlement calls
//!
//! The client never computes final balances: draft checks are advisory UX,
//! and the remote store re-validates every allocation authoritatively
//! inside one atomic-or-nothing call.

pub mod allocator;
pub mod open_items;
pub mod workspace;

pub use allocator::{SettlementAllocator, ValidationAuthority};
pub use open_items::{OpenItemsView, SettlementSuggestion};
pub use workspace::SettlementWorkspace;
