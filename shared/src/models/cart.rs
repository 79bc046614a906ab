//! Cart Models
//!
//! The session cart is ephemeral: destroyed on order submission or explicit
//! clear. Lines carry their own locally-stored price so pricing can degrade
//! to a safe local subtotal when the remote lookup fails.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::locale::LocalizedText;

/// How a cart line's quantity is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    /// Sold by count
    #[default]
    Piece,
    /// Sold by weight, priced per kilogram
    Kg,
    /// Sold by weight, priced per kilogram but entered in grams
    Gram,
}

impl UnitType {
    /// Weight-based unit types use the line weight as effective quantity
    pub fn is_weight_based(&self) -> bool {
        matches!(self, UnitType::Kg | UnitType::Gram)
    }
}

/// Addon attached to a cart line (إضافة)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    pub name: LocalizedText,
    /// Price per single addon unit
    pub price: f64,
}

/// An addon selection with its quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedAddon {
    pub addon: Addon,
    pub quantity: i32,
}

/// A single cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub item_id: String,
    pub name: LocalizedText,
    pub unit_type: UnitType,
    /// Item count (used when the unit type is not weight-based)
    pub quantity: i32,
    /// Weight in the unit's own measure (kg for Kg lines, grams for Gram lines)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Selected addons keyed by addon id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub addons: BTreeMap<String, SelectedAddon>,
    /// Set when the item is priced per sub-unit (per-kg price entered in grams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<f64>,
    /// Locally-stored unit price, the degraded-pricing fallback
    pub local_price: f64,
}

impl CartLine {
    /// Effective quantity: weight for weight-based unit types, item count otherwise
    pub fn effective_quantity(&self) -> f64 {
        if self.unit_type.is_weight_based() {
            self.weight.unwrap_or(0.0)
        } else {
            f64::from(self.quantity)
        }
    }

    /// Total addon price per single unit of the line
    pub fn addons_unit_price(&self) -> f64 {
        self.addons
            .values()
            .map(|s| s.addon.price * f64::from(s.quantity))
            .sum()
    }
}
