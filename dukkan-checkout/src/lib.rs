//! Dukkan Checkout - customer ordering flow
//!
//! The client-owned half of order placement:
//! - [`geo`]: pure geographic functions (distance, containment, zone search)
//! - [`pricing`]: per-line price resolution and multi-tier discount stacking
//! - [`location`]: the dual-accuracy geolocation protocol with stale-fix
//!   discarding
//! - [`form`]: checkout form state and field validation
//! - [`checkout`]: the orchestrator tying the above into one atomic
//!   create-order submission

pub mod checkout;
pub mod form;
pub mod geo;
pub mod location;
pub mod pricing;

pub use checkout::{CheckoutPhase, CheckoutSession};
pub use form::{CheckoutForm, FormField};
pub use geo::{ZoneMatch, calculate_distance, find_nearest_delivery_zone, format_distance,
    is_point_in_circle, verify_zone_match};
pub use location::{LocationError, LocationProvider, LocationTracker, PermissionState,
    PositionOptions};
pub use pricing::{LinePricing, PricingInputs, PricingOutcome, RecomputeGuard, compute_totals};
