//! Order Models
//!
//! The order draft is the single atomic payload submitted at checkout:
//! cart snapshot, computed totals, address, coordinates and payment
//! metadata travel together so the remote store can commit or reject the
//! whole order in one call.

use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::payment::PaymentSelection;
use super::zone::Coordinate;
use crate::types::Timestamp;

/// Computed checkout totals
///
/// Invariant: `total = max(0, subtotal - coupon - referral - tier - points)
/// + delivery_fee`; every discount term is independently non-negative and
/// capped by the amount it discounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CheckoutTotals {
    pub subtotal: f64,
    pub coupon_discount: f64,
    pub referral_discount: f64,
    pub tier_discount: f64,
    pub points_discount: f64,
    pub delivery_fee: f64,
    pub total: f64,
}

/// Order draft — the atomic create-order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub coordinate: Coordinate,
    pub zone_id: String,
    pub lines: Vec<CartLine>,
    pub totals: CheckoutTotals,
    pub payment: PaymentSelection,
    /// Redeem the customer's loyalty points against this order
    #[serde(default)]
    pub redeem_points: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    /// Scheduled delivery time; immediate delivery when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Result row returned by the create-order call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: String,
    pub created_at: Timestamp,
}
