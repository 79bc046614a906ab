//! Delivery Zone Model

use serde::{Deserialize, Serialize};

use crate::locale::LocalizedText;

/// WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Circular zone boundary (center + radius in meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCircle {
    pub lat: f64,
    pub lng: f64,
    /// Radius in meters
    pub radius: f64,
}

impl ZoneCircle {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Delivery zone entity (منطقة التوصيل)
///
/// A zone without `coordinates` cannot be geo-verified; verification
/// degrades to "always matches" for such zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub id: String,
    pub name: LocalizedText,
    pub is_active: bool,
    pub delivery_fee: f64,
    /// Estimated delivery time in minutes
    pub estimated_minutes: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<ZoneCircle>,
}
