//! Customer and Loyalty Models

use serde::{Deserialize, Serialize};

use super::coupon::DiscountType;

/// Customer entity (عميل)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    /// Referring customer, when this account was created through a referral
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    /// Whether the first-order referral benefit has already been consumed
    #[serde(default)]
    pub referral_benefit_used: bool,
    /// Completed orders before the current session
    pub prior_order_count: i64,
    pub points_balance: i64,
    /// Monetary value of the current point balance
    pub points_value: f64,
    pub is_active: bool,
}

impl Customer {
    /// Eligible for the referral first-order discount
    pub fn referral_eligible(&self) -> bool {
        self.referred_by.is_some() && !self.referral_benefit_used && self.prior_order_count == 0
    }
}

/// Referral program configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralProgram {
    pub discount_type: DiscountType,
    pub value: f64,
}

/// Loyalty points configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct LoyaltySettings {
    /// Whether the points program is enabled store-wide
    pub points_enabled: bool,
}
