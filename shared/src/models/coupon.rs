//! Coupon Model

use serde::{Deserialize, Serialize};

/// Discount type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

/// Coupon entity (قسيمة خصم)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_type: DiscountType,
    /// Percentage (30 = 30%) or fixed amount, per [`DiscountType`]
    pub value: f64,
    /// Hard cap on the computed discount amount, when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    pub is_active: bool,
}
