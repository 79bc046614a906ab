//! Pure geographic functions
//!
//! Haversine distance, circle containment and zone search. No I/O, no
//! state; everything here is deterministic over its inputs.

use shared::locale::Lang;
use shared::models::{Coordinate, DeliveryZone};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two WGS84 points, in meters (Haversine)
pub fn calculate_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether a point lies within (or on) a circle of `radius_m` meters
pub fn is_point_in_circle(
    point_lat: f64,
    point_lng: f64,
    center_lat: f64,
    center_lng: f64,
    radius_m: f64,
) -> bool {
    calculate_distance(point_lat, point_lng, center_lat, center_lng) <= radius_m
}

/// Find the delivery zone for a user location.
///
/// Zones without coordinates cannot participate in the geographic search;
/// when no zone has coordinates at all, the first active zone (or the first
/// zone of any status) is returned as a soft "better than nothing" fallback.
///
/// First pass: the first *active* zone whose circle contains the point.
/// First-match order is the input array order, not nearest-first — a
/// deliberate tie-break when several active circles overlap the point.
/// Second pass: the geometrically nearest zone among those with
/// coordinates, regardless of active status.
pub fn find_nearest_delivery_zone<'a>(
    user_location: Coordinate,
    zones: &'a [DeliveryZone],
) -> Option<&'a DeliveryZone> {
    let with_coords: Vec<&DeliveryZone> =
        zones.iter().filter(|z| z.coordinates.is_some()).collect();

    if with_coords.is_empty() {
        return zones.iter().find(|z| z.is_active).or_else(|| zones.first());
    }

    for &zone in &with_coords {
        if !zone.is_active {
            continue;
        }
        if let Some(circle) = &zone.coordinates
            && is_point_in_circle(
                user_location.lat,
                user_location.lng,
                circle.lat,
                circle.lng,
                circle.radius,
            )
        {
            return Some(zone);
        }
    }

    with_coords.into_iter().min_by(|a, b| {
        let da = zone_distance(user_location, a);
        let db = zone_distance(user_location, b);
        da.total_cmp(&db)
    })
}

fn zone_distance(user_location: Coordinate, zone: &DeliveryZone) -> f64 {
    match &zone.coordinates {
        Some(c) => calculate_distance(user_location.lat, user_location.lng, c.lat, c.lng),
        None => f64::INFINITY,
    }
}

/// Outcome of verifying a captured location against a zone's circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneMatch {
    pub matches: bool,
    /// Distance from the zone center, when the zone can be verified
    pub distance: Option<f64>,
    pub is_inside: Option<bool>,
}

/// Verify that a location falls inside a zone's configured circle.
///
/// A zone without coordinates cannot be verified and unconditionally
/// matches (assume trust).
pub fn verify_zone_match(user_location: Coordinate, zone: &DeliveryZone) -> ZoneMatch {
    let Some(circle) = &zone.coordinates else {
        return ZoneMatch {
            matches: true,
            distance: None,
            is_inside: None,
        };
    };

    let distance =
        calculate_distance(user_location.lat, user_location.lng, circle.lat, circle.lng);
    let is_inside = distance <= circle.radius;

    ZoneMatch {
        matches: is_inside,
        distance: Some(distance),
        is_inside: Some(is_inside),
    }
}

/// Human-readable distance: meters below 1 km, kilometers to one decimal
/// above, with a localized unit suffix.
pub fn format_distance(meters: f64, lang: Lang) -> String {
    let (m_unit, km_unit) = match lang {
        Lang::Ar => ("م", "كم"),
        Lang::En => ("m", "km"),
    };
    if meters < 1000.0 {
        format!("{:.0} {}", meters, m_unit)
    } else {
        format!("{:.1} {}", meters / 1000.0, km_unit)
    }
}
