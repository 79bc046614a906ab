//! Data models
//!
//! Shared between the checkout/ledger crates and the remote store (via API).
//! Rows are decoded at the client boundary with serde — malformed remote
//! data fails fast there instead of propagating untyped values inward.
//! All monetary amounts are `f64` on the wire; computation uses `Decimal`
//! through [`crate::money`].

pub mod cart;
pub mod coupon;
pub mod customer;
pub mod open_item;
pub mod order;
pub mod party;
pub mod payment;
pub mod settlement;
pub mod zone;

// Re-exports
pub use cart::*;
pub use coupon::*;
pub use customer::*;
pub use open_item::*;
pub use order::*;
pub use party::*;
pub use payment::*;
pub use settlement::*;
pub use zone::*;
