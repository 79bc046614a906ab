//! Pricing Aggregator
//!
//! Resolves per-line prices through the remote lookup and stacks the four
//! discount sources into [`CheckoutTotals`]. Uses `Decimal` internally and
//! `f64` at the edges.
//!
//! Discount sequencing is load-bearing and reproduced exactly:
//! 1. referral (first-order benefit)
//! 2. coupon — computed against the *raw* subtotal, capped by
//!    `max_discount` then by the subtotal
//! 3. points — capped by subtotal minus the other three discounts
//! 4. total floors at zero before the delivery fee is added
//!
//! Any lookup failure degrades the whole recompute to the cart's own
//! locally-stored subtotal with zero discounts: availability over
//! precision, never a blocking error.

use futures::future::try_join_all;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use dukkan_client::{RemoteStore, StoreResult};
use shared::models::{
    CartLine, CheckoutTotals, Coupon, Customer, DeliveryZone, DiscountType, LoyaltySettings,
    ReferralProgram, UnitType,
};
use shared::money::{to_decimal, to_f64};

/// Resolved pricing for one cart line
#[derive(Debug, Clone, PartialEq)]
pub struct LinePricing {
    pub line_id: String,
    /// Normalized unit price (per gram for gram-priced lines)
    pub unit_price: f64,
    /// Tier discount percent from the pricing lookup
    pub discount_percent: f64,
    /// `(unit_price + addons) * effective_quantity`
    pub line_subtotal: f64,
    /// Tier discount amount — applies to the base unit price only, never addons
    pub line_discount: f64,
}

/// Everything the aggregator needs beside the remote lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingInputs<'a> {
    pub customer: Option<&'a Customer>,
    pub coupon: Option<&'a Coupon>,
    pub referral: Option<&'a ReferralProgram>,
    pub loyalty: LoyaltySettings,
    /// Whether the customer toggled point redemption on
    pub redeem_points: bool,
    pub selected_zone: Option<&'a DeliveryZone>,
}

/// Aggregated pricing result
#[derive(Debug, Clone, PartialEq)]
pub struct PricingOutcome {
    pub totals: CheckoutTotals,
    pub lines: Vec<LinePricing>,
    /// True when the remote lookup failed and the local fallback was used
    pub degraded: bool,
}

/// Resolve one line through the remote pricing lookup
async fn resolve_line(
    store: &dyn RemoteStore,
    line: &CartLine,
    customer_id: Option<&str>,
) -> StoreResult<LinePricing> {
    let quantity = line.effective_quantity();
    let (raw_price, discount_percent) = futures::try_join!(
        store.get_item_price(&line.item_id, customer_id, quantity),
        store.get_item_discount(&line.item_id, customer_id, quantity),
    )?;

    // The lookup returns a per-kilogram-equivalent price; gram-entered
    // lines with a per-unit price scale it down to per-gram.
    let unit_price = if line.unit_type == UnitType::Gram && line.price_per_unit.is_some() {
        to_decimal(raw_price) / Decimal::from(1000)
    } else {
        to_decimal(raw_price)
    };

    let qty = to_decimal(quantity);
    let addons = to_decimal(line.addons_unit_price());
    let pct = to_decimal(discount_percent) / Decimal::ONE_HUNDRED;

    let line_subtotal = (unit_price + addons) * qty;
    let line_discount = unit_price * pct * qty;

    Ok(LinePricing {
        line_id: line.id.clone(),
        unit_price: to_f64(unit_price),
        discount_percent,
        line_subtotal: to_f64(line_subtotal),
        line_discount: to_f64(line_discount),
    })
}

/// Local fallback subtotal from the cart's own stored prices
fn local_subtotal(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .map(|l| {
            (to_decimal(l.local_price) + to_decimal(l.addons_unit_price()))
                * to_decimal(l.effective_quantity())
        })
        .sum()
}

/// Compute checkout totals for the cart.
///
/// The remote lookup runs per line; a failure anywhere degrades the whole
/// computation to the local cart subtotal with zero discounts.
pub async fn compute_totals(
    store: &dyn RemoteStore,
    lines: &[CartLine],
    inputs: PricingInputs<'_>,
) -> PricingOutcome {
    let customer_id = inputs.customer.map(|c| c.id.as_str());

    let resolved =
        try_join_all(lines.iter().map(|l| resolve_line(store, l, customer_id))).await;

    match resolved {
        Ok(line_pricing) => {
            let subtotal: Decimal =
                line_pricing.iter().map(|l| to_decimal(l.line_subtotal)).sum();
            let tier: Decimal =
                line_pricing.iter().map(|l| to_decimal(l.line_discount)).sum();
            let totals = stack_discounts(subtotal, tier, &inputs);
            PricingOutcome {
                totals,
                lines: line_pricing,
                degraded: false,
            }
        }
        Err(err) => {
            warn!(error = %err, "pricing lookup failed, falling back to local cart subtotal");
            let subtotal = local_subtotal(lines);
            let totals = stack_discounts(subtotal, Decimal::ZERO, &degraded_inputs(&inputs));
            PricingOutcome {
                totals,
                lines: Vec::new(),
                degraded: true,
            }
        }
    }
}

/// Degraded mode keeps only the zone selection (the delivery fee is not a
/// discount); every discount source is dropped.
fn degraded_inputs<'a>(inputs: &PricingInputs<'a>) -> PricingInputs<'a> {
    PricingInputs {
        customer: None,
        coupon: None,
        referral: None,
        loyalty: LoyaltySettings::default(),
        redeem_points: false,
        selected_zone: inputs.selected_zone,
    }
}

/// Apply the discount sequence to an already-aggregated subtotal
fn stack_discounts(subtotal: Decimal, tier: Decimal, inputs: &PricingInputs<'_>) -> CheckoutTotals {
    // 1. Referral: first-order benefit only
    let referral = match (inputs.customer, inputs.referral) {
        (Some(customer), Some(program)) if customer.referral_eligible() => {
            match program.discount_type {
                DiscountType::Percentage => {
                    subtotal * to_decimal(program.value) / Decimal::ONE_HUNDRED
                }
                DiscountType::FixedAmount => to_decimal(program.value).min(subtotal),
            }
        }
        _ => Decimal::ZERO,
    };

    // 2. Coupon: computed against the raw subtotal (not subtotal-minus-referral),
    //    capped by max_discount, then by the subtotal itself
    let coupon = match inputs.coupon {
        Some(c) if c.is_active => {
            let raw = match c.discount_type {
                DiscountType::Percentage => {
                    subtotal * to_decimal(c.value) / Decimal::ONE_HUNDRED
                }
                DiscountType::FixedAmount => to_decimal(c.value),
            };
            let capped = match c.max_discount {
                Some(cap) => raw.min(to_decimal(cap)),
                None => raw,
            };
            capped.min(subtotal).max(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    };

    // 3. Points: capped by whatever remains after the other three discounts,
    //    even though it is computed last
    let points = match inputs.customer {
        Some(customer)
            if inputs.redeem_points
                && inputs.loyalty.points_enabled
                && customer.points_balance > 0 =>
        {
            let remaining = (subtotal - coupon - tier - referral).max(Decimal::ZERO);
            to_decimal(customer.points_value).min(remaining)
        }
        _ => Decimal::ZERO,
    };

    // Delivery fee: the selected active zone's fee; zero without a zone or
    // with an empty-value cart
    let delivery_fee = match inputs.selected_zone {
        Some(zone) if zone.is_active && subtotal > Decimal::ZERO => {
            to_decimal(zone.delivery_fee)
        }
        _ => Decimal::ZERO,
    };

    // 4. The pre-fee portion floors at zero
    let total = (subtotal - coupon - tier - points - referral).max(Decimal::ZERO) + delivery_fee;

    CheckoutTotals {
        subtotal: to_f64(subtotal),
        coupon_discount: to_f64(coupon),
        referral_discount: to_f64(referral),
        tier_discount: to_f64(tier),
        points_discount: to_f64(points),
        delivery_fee: to_f64(delivery_fee),
        total: to_f64(total),
    }
}

/// Stale-write guard for cart recomputes.
///
/// Each recompute captures a token at effect-start; beginning a newer
/// recompute cancels every older token. A superseded computation still
/// completes its network calls, but its result is discarded instead of
/// committed.
#[derive(Debug, Default)]
pub struct RecomputeGuard {
    current: Option<CancellationToken>,
}

impl RecomputeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new recompute, superseding any in-flight one
    pub fn begin(&mut self) -> CancellationToken {
        if let Some(prev) = self.current.take() {
            prev.cancel();
        }
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    /// Drop the in-flight recompute without starting a new one
    pub fn reset(&mut self) {
        if let Some(prev) = self.current.take() {
            prev.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dukkan_client::memory::MemoryStore;
    use shared::locale::LocalizedText;
    use shared::models::ZoneCircle;
    use std::collections::BTreeMap;

    fn line(id: &str, item: &str, unit_type: UnitType, qty: i32, weight: Option<f64>) -> CartLine {
        CartLine {
            id: id.to_string(),
            item_id: item.to_string(),
            name: LocalizedText::new("صنف", "Item"),
            unit_type,
            quantity: qty,
            weight,
            addons: BTreeMap::new(),
            price_per_unit: None,
            local_price: 0.0,
        }
    }

    fn zone(fee: f64) -> DeliveryZone {
        DeliveryZone {
            id: "z1".to_string(),
            name: LocalizedText::new("صنعاء الجديدة", "New Sana'a"),
            is_active: true,
            delivery_fee: fee,
            estimated_minutes: 45,
            coordinates: Some(ZoneCircle {
                lat: 15.0,
                lng: 44.0,
                radius: 2000.0,
            }),
        }
    }

    fn customer_with_points(points_value: f64) -> Customer {
        Customer {
            id: "c1".to_string(),
            name: "سارة".to_string(),
            phone: None,
            referred_by: None,
            referral_benefit_used: false,
            prior_order_count: 5,
            points_balance: 1000,
            points_value,
            is_active: true,
        }
    }

    fn first_order_referred_customer() -> Customer {
        Customer {
            id: "c2".to_string(),
            name: "خالد".to_string(),
            phone: None,
            referred_by: Some("c9".to_string()),
            referral_benefit_used: false,
            prior_order_count: 0,
            points_balance: 0,
            points_value: 0.0,
            is_active: true,
        }
    }

    fn percent_coupon(value: f64, max_discount: Option<f64>) -> Coupon {
        Coupon {
            id: "cp1".to_string(),
            code: "SAVE".to_string(),
            discount_type: DiscountType::Percentage,
            value,
            max_discount,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn piece_line_subtotal_with_tier_discount() {
        let store = MemoryStore::new();
        store.set_price("apple", 10.0);
        store.set_discount("apple", 10.0);

        let lines = vec![line("l1", "apple", UnitType::Piece, 3, None)];
        let outcome = compute_totals(&store, &lines, PricingInputs::default()).await;

        assert!(!outcome.degraded);
        assert_eq!(outcome.totals.subtotal, 30.0);
        assert_eq!(outcome.totals.tier_discount, 3.0);
        assert_eq!(outcome.totals.total, 27.0);
    }

    #[tokio::test]
    async fn gram_line_divides_per_kg_price() {
        let store = MemoryStore::new();
        store.set_price("saffron", 2000.0); // per kilogram
        store.set_discount("saffron", 0.0);

        let mut l = line("l1", "saffron", UnitType::Gram, 1, Some(500.0));
        l.price_per_unit = Some(2.0);
        let outcome = compute_totals(&store, &[l], PricingInputs::default()).await;

        // 2000 / 1000 = 2.0 per gram, 500 g => 1000
        assert_eq!(outcome.totals.subtotal, 1000.0);
    }

    #[tokio::test]
    async fn addons_are_never_discounted() {
        let store = MemoryStore::new();
        store.set_price("shawarma", 20.0);
        store.set_discount("shawarma", 50.0);

        let mut l = line("l1", "shawarma", UnitType::Piece, 2, None);
        l.addons.insert(
            "extra".to_string(),
            shared::models::SelectedAddon {
                addon: shared::models::Addon {
                    id: "extra".to_string(),
                    name: LocalizedText::new("جبن إضافي", "Extra cheese"),
                    price: 3.0,
                },
                quantity: 1,
            },
        );
        let outcome = compute_totals(&store, &[l], PricingInputs::default()).await;

        // subtotal (20+3)*2 = 46; tier discount on base only: 20*0.5*2 = 20
        assert_eq!(outcome.totals.subtotal, 46.0);
        assert_eq!(outcome.totals.tier_discount, 20.0);
    }

    #[tokio::test]
    async fn coupon_discount_never_exceeds_subtotal() {
        let store = MemoryStore::new();
        store.set_price("apple", 10.0);

        let coupon = percent_coupon(200.0, None);
        let lines = vec![line("l1", "apple", UnitType::Piece, 5, None)];
        let inputs = PricingInputs {
            coupon: Some(&coupon),
            ..Default::default()
        };
        let outcome = compute_totals(&store, &lines, inputs).await;

        assert_eq!(outcome.totals.subtotal, 50.0);
        assert_eq!(outcome.totals.coupon_discount, 50.0);
        assert_eq!(outcome.totals.total, 0.0);
    }

    #[tokio::test]
    async fn coupon_max_discount_caps_before_subtotal_cap() {
        let store = MemoryStore::new();
        store.set_price("apple", 10.0);

        let coupon = percent_coupon(50.0, Some(10.0));
        let lines = vec![line("l1", "apple", UnitType::Piece, 10, None)];
        let inputs = PricingInputs {
            coupon: Some(&coupon),
            ..Default::default()
        };
        let outcome = compute_totals(&store, &lines, inputs).await;

        assert_eq!(outcome.totals.coupon_discount, 10.0);
        assert_eq!(outcome.totals.total, 90.0);
    }

    #[tokio::test]
    async fn points_capped_by_remaining_after_other_discounts() {
        let store = MemoryStore::new();
        store.set_price("apple", 10.0);

        let customer = customer_with_points(1000.0);
        let coupon = Coupon {
            id: "cp1".to_string(),
            code: "FIX30".to_string(),
            discount_type: DiscountType::FixedAmount,
            value: 30.0,
            max_discount: None,
            is_active: true,
        };
        let lines = vec![line("l1", "apple", UnitType::Piece, 10, None)];
        let inputs = PricingInputs {
            customer: Some(&customer),
            coupon: Some(&coupon),
            loyalty: LoyaltySettings {
                points_enabled: true,
            },
            redeem_points: true,
            ..Default::default()
        };
        let outcome = compute_totals(&store, &lines, inputs).await;

        // subtotal 100, coupon 30, tier 0, referral 0 => points cap 70
        assert_eq!(outcome.totals.points_discount, 70.0);
        assert_eq!(outcome.totals.total, 0.0);
    }

    #[tokio::test]
    async fn points_need_toggle_program_and_balance() {
        let store = MemoryStore::new();
        store.set_price("apple", 10.0);

        let customer = customer_with_points(50.0);
        let lines = vec![line("l1", "apple", UnitType::Piece, 10, None)];

        // Toggle off
        let inputs = PricingInputs {
            customer: Some(&customer),
            loyalty: LoyaltySettings {
                points_enabled: true,
            },
            redeem_points: false,
            ..Default::default()
        };
        let outcome = compute_totals(&store, &lines, inputs).await;
        assert_eq!(outcome.totals.points_discount, 0.0);

        // Program disabled
        let inputs = PricingInputs {
            customer: Some(&customer),
            loyalty: LoyaltySettings {
                points_enabled: false,
            },
            redeem_points: true,
            ..Default::default()
        };
        let outcome = compute_totals(&store, &lines, inputs).await;
        assert_eq!(outcome.totals.points_discount, 0.0);
    }

    #[tokio::test]
    async fn referral_first_order_end_to_end() {
        let store = MemoryStore::new();
        store.set_price("basket", 100.0);

        let customer = first_order_referred_customer();
        let program = ReferralProgram {
            discount_type: DiscountType::Percentage,
            value: 10.0,
        };
        let z = zone(20.0);
        let lines = vec![line("l1", "basket", UnitType::Piece, 5, None)];
        let inputs = PricingInputs {
            customer: Some(&customer),
            referral: Some(&program),
            selected_zone: Some(&z),
            ..Default::default()
        };
        let outcome = compute_totals(&store, &lines, inputs).await;

        // subtotal 500, referral 50, points 0, fee 20 => total 470
        assert_eq!(outcome.totals.subtotal, 500.0);
        assert_eq!(outcome.totals.referral_discount, 50.0);
        assert_eq!(outcome.totals.points_discount, 0.0);
        assert_eq!(outcome.totals.delivery_fee, 20.0);
        assert_eq!(outcome.totals.total, 470.0);
    }

    #[tokio::test]
    async fn total_floors_at_delivery_fee_for_huge_discounts() {
        let store = MemoryStore::new();
        store.set_price("apple", 10.0);
        store.set_discount("apple", 100.0);

        let customer = customer_with_points(100_000.0);
        let coupon = percent_coupon(500.0, None);
        let z = zone(15.0);
        let lines = vec![line("l1", "apple", UnitType::Piece, 10, None)];
        let inputs = PricingInputs {
            customer: Some(&customer),
            coupon: Some(&coupon),
            loyalty: LoyaltySettings {
                points_enabled: true,
            },
            redeem_points: true,
            selected_zone: Some(&z),
            ..Default::default()
        };
        let outcome = compute_totals(&store, &lines, inputs).await;

        assert!(outcome.totals.total >= outcome.totals.delivery_fee);
        assert_eq!(outcome.totals.total, 15.0);
    }

    #[tokio::test]
    async fn lookup_failure_degrades_to_local_subtotal() {
        let store = MemoryStore::new();
        store.fail_pricing(true);

        let customer = customer_with_points(100.0);
        let coupon = percent_coupon(50.0, None);
        let mut l = line("l1", "apple", UnitType::Piece, 4, None);
        l.local_price = 7.5;
        let inputs = PricingInputs {
            customer: Some(&customer),
            coupon: Some(&coupon),
            loyalty: LoyaltySettings {
                points_enabled: true,
            },
            redeem_points: true,
            ..Default::default()
        };
        let outcome = compute_totals(&store, &[l], inputs).await;

        assert!(outcome.degraded);
        assert_eq!(outcome.totals.subtotal, 30.0);
        assert_eq!(outcome.totals.coupon_discount, 0.0);
        assert_eq!(outcome.totals.points_discount, 0.0);
        assert_eq!(outcome.totals.total, 30.0);
    }

    #[tokio::test]
    async fn empty_cart_pays_no_delivery_fee() {
        let store = MemoryStore::new();
        let z = zone(20.0);
        let inputs = PricingInputs {
            selected_zone: Some(&z),
            ..Default::default()
        };
        let outcome = compute_totals(&store, &[], inputs).await;

        assert_eq!(outcome.totals.subtotal, 0.0);
        assert_eq!(outcome.totals.delivery_fee, 0.0);
        assert_eq!(outcome.totals.total, 0.0);
    }

    #[test]
    fn recompute_guard_cancels_superseded_tokens() {
        let mut guard = RecomputeGuard::new();
        let first = guard.begin();
        assert!(!first.is_cancelled());

        let second = guard.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        guard.reset();
        assert!(second.is_cancelled());
    }
}
