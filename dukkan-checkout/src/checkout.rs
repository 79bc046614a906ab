//! Checkout Orchestrator
//!
//! Owns the cart-to-order transformation: collects customer, address and
//! payment inputs, drives zone detection/verification, recomputes totals,
//! and submits the composed order as one atomic create-order call.
//!
//! The flow is an explicit phase machine (`Editing -> Locating ->
//! Submitting -> Submitted | Failed`) instead of a cascade of derived-state
//! effects. Zone checks run twice with different strength: advisory
//! (non-blocking warning) while editing, hard gate at submission.

use std::sync::Arc;

use tracing::{debug, info};

use dukkan_client::RemoteStore;
use shared::error::{AppError, ErrorCode};
use shared::locale::{Lang, localized};
use shared::models::{
    CartLine, CheckoutTotals, Coordinate, Coupon, Customer, DeliveryZone, LoyaltySettings,
    OrderDraft, OrderReceipt, PaymentConfig, PaymentSelection, ReferralProgram,
};
use shared::notify::{NoticeKind, Notifier};
use shared::util::now_millis;

use crate::form::{
    CheckoutForm, validate_address, validate_customer_name, validate_payment_proof,
    validate_phone, validate_schedule,
};
use crate::geo::{find_nearest_delivery_zone, format_distance, verify_zone_match};
use crate::location::{self, LocationProvider, LocationTracker};
use crate::pricing::{self, PricingInputs, RecomputeGuard};

/// Checkout flow phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Collecting form input; validation is advisory
    Editing,
    /// A geolocation request is in flight
    Locating,
    /// The create-order call is in flight; the submit control is disabled
    Submitting,
    /// Order committed; the cart has been cleared
    Submitted { order_id: String },
    /// The remote store rejected the submission; form state is preserved
    Failed { message: String },
}

/// Checkout session over one cart
pub struct CheckoutSession {
    store: Arc<dyn RemoteStore>,
    provider: Arc<dyn LocationProvider>,
    tracker: Arc<LocationTracker>,
    notifier: Arc<Notifier>,
    lang: Lang,

    // Catalog and customer context
    zones: Vec<DeliveryZone>,
    payment_config: PaymentConfig,
    customer: Option<Customer>,
    referral: Option<ReferralProgram>,
    loyalty: LoyaltySettings,
    coupon: Option<Coupon>,

    // Working state
    cart: Vec<CartLine>,
    pub form: CheckoutForm,
    selected_zone_id: Option<String>,
    totals: CheckoutTotals,
    pricing_degraded: bool,
    pricing_guard: RecomputeGuard,
    phase: CheckoutPhase,
}

impl CheckoutSession {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        provider: Arc<dyn LocationProvider>,
        notifier: Arc<Notifier>,
        lang: Lang,
    ) -> Self {
        Self {
            store,
            provider,
            tracker: Arc::new(LocationTracker::new()),
            notifier,
            lang,
            zones: Vec::new(),
            payment_config: PaymentConfig::default(),
            customer: None,
            referral: None,
            loyalty: LoyaltySettings::default(),
            coupon: None,
            cart: Vec::new(),
            form: CheckoutForm::default(),
            selected_zone_id: None,
            totals: CheckoutTotals::default(),
            pricing_degraded: false,
            pricing_guard: RecomputeGuard::new(),
            phase: CheckoutPhase::Editing,
        }
    }

    // ========== Context ==========

    /// Load delivery zones from the remote store
    pub async fn load_zones(&mut self) -> Result<(), AppError> {
        match self.store.list_delivery_zones().await {
            Ok(zones) => {
                self.zones = zones;
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "zone list load failed");
                Err(AppError::with_message(
                    ErrorCode::NetworkError,
                    err.surface(self.lang),
                ))
            }
        }
    }

    pub fn set_zones(&mut self, zones: Vec<DeliveryZone>) {
        self.zones = zones;
    }

    pub fn set_payment_config(&mut self, config: PaymentConfig) {
        self.payment_config = config;
    }

    /// Cart and customer identity changes both invalidate pricing; callers
    /// follow each with [`refresh_totals`](Self::refresh_totals).
    pub fn set_customer(&mut self, customer: Option<Customer>) {
        self.customer = customer;
    }

    pub fn set_referral_program(&mut self, program: Option<ReferralProgram>) {
        self.referral = program;
    }

    pub fn set_loyalty(&mut self, loyalty: LoyaltySettings) {
        self.loyalty = loyalty;
    }

    pub fn apply_coupon(&mut self, coupon: Coupon) {
        self.form.coupon_code = coupon.code.clone();
        self.coupon = Some(coupon);
    }

    pub fn clear_coupon(&mut self) {
        self.form.coupon_code.clear();
        self.coupon = None;
    }

    pub fn set_cart(&mut self, cart: Vec<CartLine>) {
        self.cart = cart;
    }

    // ========== Accessors ==========

    pub fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    pub fn totals(&self) -> &CheckoutTotals {
        &self.totals
    }

    /// True when the last recompute fell back to local cart prices
    pub fn pricing_degraded(&self) -> bool {
        self.pricing_degraded
    }

    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    pub fn tracker(&self) -> &Arc<LocationTracker> {
        &self.tracker
    }

    pub fn selected_zone(&self) -> Option<&DeliveryZone> {
        let id = self.selected_zone_id.as_deref()?;
        self.zones.iter().find(|z| z.id == id)
    }

    // ========== Pricing ==========

    /// Recompute totals for the current cart, customer and coupon.
    ///
    /// A newer recompute supersedes this one: the superseded call still
    /// finishes its lookups but its result is discarded, never committed.
    pub async fn refresh_totals(&mut self) {
        let token = self.pricing_guard.begin();
        let store = self.store.clone();
        let inputs = PricingInputs {
            customer: self.customer.as_ref(),
            coupon: self.coupon.as_ref(),
            referral: self.referral.as_ref(),
            loyalty: self.loyalty,
            redeem_points: self.form.redeem_points,
            selected_zone: self.selected_zone(),
        };
        let outcome = pricing::compute_totals(store.as_ref(), &self.cart, inputs).await;

        if token.is_cancelled() {
            debug!("discarding superseded pricing recompute");
            return;
        }
        self.totals = outcome.totals;
        self.pricing_degraded = outcome.degraded;
    }

    // ========== Zone and location ==========

    /// Manual zone choice; verification stays advisory until submission
    pub fn select_zone(&mut self, zone_id: &str) -> Result<(), AppError> {
        if !self.zones.iter().any(|z| z.id == zone_id) {
            return Err(AppError::not_found("zone"));
        }
        self.selected_zone_id = Some(zone_id.to_string());
        self.advisory_zone_check();
        Ok(())
    }

    /// The user picked a point on the map; takes precedence over any
    /// in-flight detection result.
    pub fn set_manual_location(&mut self, coordinate: Coordinate) {
        self.tracker.set_manual(coordinate);
        self.advisory_zone_check();
    }

    /// Run the dual-accuracy location protocol and auto-detect the zone.
    ///
    /// The fast fix applies immediately; a high-accuracy refinement keeps
    /// running in the background and only lands if nothing newer happened.
    /// On failure the map UI stays usable for a manual pick.
    pub async fn detect_location(&mut self) -> Result<Coordinate, AppError> {
        self.phase = CheckoutPhase::Locating;
        let request_id = self.tracker.begin_request();

        let acquired =
            location::acquire_fast(self.provider.as_ref(), self.tracker.as_ref(), request_id)
                .await;
        self.phase = CheckoutPhase::Editing;

        let coordinate = match acquired {
            Ok(coordinate) => coordinate,
            Err(err) => {
                let code = err.code();
                self.notifier.error(localized(code, self.lang));
                return Err(AppError::with_message(code, localized(code, self.lang)));
            }
        };

        // Background refinement; stale results are discarded by request id
        let provider = self.provider.clone();
        let tracker = self.tracker.clone();
        tokio::spawn(async move {
            location::refine(provider.as_ref(), tracker.as_ref(), request_id).await;
        });

        self.after_location_update(coordinate);
        Ok(coordinate)
    }

    /// Zone auto-detection plus the advisory mismatch warning
    fn after_location_update(&mut self, coordinate: Coordinate) {
        if let Some(zone) = find_nearest_delivery_zone(coordinate, &self.zones) {
            if self.selected_zone_id.as_deref() != Some(zone.id.as_str()) {
                self.selected_zone_id = Some(zone.id.clone());
                self.notifier.once(
                    format!("zone-detected:{}", zone.id),
                    NoticeKind::Success,
                    zone_detected_message(zone, self.lang),
                );
            }
        }
        self.advisory_zone_check();
    }

    /// Non-blocking mismatch warning; the same check becomes a hard gate
    /// inside [`validation_errors`](Self::validation_errors).
    fn advisory_zone_check(&self) {
        let (Some(zone), Some(coordinate)) = (self.selected_zone(), self.tracker.current())
        else {
            return;
        };
        let matched = verify_zone_match(coordinate, zone);
        if !matched.matches
            && let Some(distance) = matched.distance
        {
            self.notifier
                .warning(zone_mismatch_message(distance, self.lang));
        }
    }

    // ========== Validation ==========

    /// All failed submission gates, in evaluation order. Advisory while
    /// editing; submission requires this list to be empty.
    pub fn validation_errors(&self, now: i64) -> Vec<AppError> {
        let lang = self.lang;
        let mut errors = Vec::new();

        if self.cart.is_empty() {
            errors.push(AppError::with_message(
                ErrorCode::CartEmpty,
                localized(ErrorCode::CartEmpty, lang),
            ));
        }

        if let Err(e) = validate_customer_name(&self.form.name, lang) {
            errors.push(e);
        }
        if let Err(e) = validate_phone(&self.form.phone, lang) {
            errors.push(e);
        }
        if let Err(e) = validate_address(&self.form.address, lang) {
            errors.push(e);
        }

        match self.form.payment_method {
            None => errors.push(AppError::with_message(
                ErrorCode::PaymentMethodUnavailable,
                localized(ErrorCode::PaymentMethodUnavailable, lang),
            )),
            Some(method) => {
                if !self.payment_config.method_available(method) {
                    errors.push(AppError::with_message(
                        ErrorCode::PaymentMethodUnavailable,
                        localized(ErrorCode::PaymentMethodUnavailable, lang),
                    ));
                }
                if let Err(e) = validate_payment_proof(method, &self.form.payment_proof, lang) {
                    errors.push(e);
                }
                if method.requires_proof() {
                    let target_ok = self
                        .form
                        .payment_target_id
                        .as_deref()
                        .is_some_and(|id| {
                            self.payment_config.targets_for(method).any(|t| t.id == id)
                        });
                    if !target_ok {
                        errors.push(AppError::with_message(
                            ErrorCode::PaymentTargetMissing,
                            localized(ErrorCode::PaymentTargetMissing, lang),
                        ));
                    }
                }
            }
        }

        match self.selected_zone() {
            None => errors.push(AppError::with_message(
                ErrorCode::ZoneNotSelected,
                localized(ErrorCode::ZoneNotSelected, lang),
            )),
            Some(zone) => {
                if !zone.is_active {
                    errors.push(AppError::with_message(
                        ErrorCode::ZoneInactive,
                        localized(ErrorCode::ZoneInactive, lang),
                    ));
                }

                // No address-only orders: a captured coordinate is required
                match self.tracker.current() {
                    None => errors.push(AppError::with_message(
                        ErrorCode::LocationMissing,
                        localized(ErrorCode::LocationMissing, lang),
                    )),
                    Some(coordinate) => {
                        let matched = verify_zone_match(coordinate, zone);
                        if !matched.matches {
                            let distance = matched.distance.unwrap_or_default();
                            errors.push(
                                AppError::with_message(
                                    ErrorCode::ZoneMismatch,
                                    zone_mismatch_message(distance, lang),
                                )
                                .with_detail("distance_m", distance),
                            );
                        }
                    }
                }
            }
        }

        if let Some(scheduled_at) = self.form.scheduled_at
            && let Err(e) = validate_schedule(scheduled_at, now, lang)
        {
            errors.push(e);
        }

        errors
    }

    // ========== Submission ==========

    /// Validate every gate and issue the atomic create-order call.
    ///
    /// Success clears the cart. Failure preserves the entire form state and
    /// surfaces the remote message; retry is always a deliberate user
    /// action, never automatic.
    pub async fn submit(&mut self) -> Result<OrderReceipt, AppError> {
        if self.phase == CheckoutPhase::Submitting {
            return Err(AppError::invalid_request("submission already in flight"));
        }

        let errors = self.validation_errors(now_millis());
        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }

        // Totals may be stale relative to the latest form toggles
        self.refresh_totals().await;

        let draft = self.compose_draft();
        self.phase = CheckoutPhase::Submitting;

        match self.store.create_order(&draft).await {
            Ok(receipt) => {
                info!(order_id = %receipt.id, "order created");
                self.cart.clear();
                self.pricing_guard.reset();
                self.phase = CheckoutPhase::Submitted {
                    order_id: receipt.id.clone(),
                };
                Ok(receipt)
            }
            Err(err) => {
                let message = err.surface(self.lang);
                self.notifier.error(message.clone());
                self.phase = CheckoutPhase::Failed {
                    message: message.clone(),
                };
                Err(AppError::with_message(ErrorCode::OrderRejected, message))
            }
        }
    }

    fn compose_draft(&self) -> OrderDraft {
        // Every gate has passed; the fallbacks below are unreachable
        let coordinate = self.tracker.current().unwrap_or(Coordinate::new(0.0, 0.0));
        let zone_id = self.selected_zone_id.clone().unwrap_or_default();
        let method = self
            .form
            .payment_method
            .unwrap_or(shared::models::PaymentMethod::Cash);

        OrderDraft {
            customer_id: self.customer.as_ref().map(|c| c.id.clone()),
            customer_name: self.form.name.trim().to_string(),
            phone: self.form.phone.trim().to_string(),
            address: self.form.address.trim().to_string(),
            coordinate,
            zone_id,
            lines: self.cart.clone(),
            totals: self.totals,
            payment: PaymentSelection {
                method,
                target_id: self.form.payment_target_id.clone(),
                proof: self.form.payment_proof.clone(),
            },
            redeem_points: self.form.redeem_points,
            coupon_code: self
                .coupon
                .as_ref()
                .map(|c| c.code.clone())
                .filter(|c| !c.is_empty()),
            scheduled_at: self.form.scheduled_at,
            notes: Some(self.form.notes.trim().to_string()).filter(|n| !n.is_empty()),
        }
    }
}

fn zone_detected_message(zone: &DeliveryZone, lang: Lang) -> String {
    match lang {
        Lang::Ar => format!("تم تحديد منطقة التوصيل: {}", zone.name.get(lang)),
        Lang::En => format!("Delivery zone detected: {}", zone.name.get(lang)),
    }
}

fn zone_mismatch_message(distance: f64, lang: Lang) -> String {
    format!(
        "{} ({})",
        localized(ErrorCode::ZoneMismatch, lang),
        format_distance(distance, lang)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormField;
    use dukkan_client::memory::MemoryStore;
    use shared::locale::LocalizedText;
    use shared::models::{PaymentMethod, ZoneCircle};

    struct NoopProvider;

    #[async_trait::async_trait]
    impl LocationProvider for NoopProvider {
        async fn current_position(
            &self,
            _options: crate::location::PositionOptions,
        ) -> Result<Coordinate, crate::location::LocationError> {
            Ok(Coordinate::new(15.0, 44.0))
        }

        async fn permission_state(&self) -> crate::location::PermissionState {
            crate::location::PermissionState::Granted
        }
    }

    fn zone(id: &str, active: bool, lat: f64, radius: f64) -> DeliveryZone {
        DeliveryZone {
            id: id.to_string(),
            name: LocalizedText::new("حدة", "Hadda"),
            is_active: active,
            delivery_fee: 20.0,
            estimated_minutes: 45,
            coordinates: Some(ZoneCircle {
                lat,
                lng: 44.0,
                radius,
            }),
        }
    }

    fn session_with(store: Arc<MemoryStore>) -> CheckoutSession {
        CheckoutSession::new(
            store,
            Arc::new(NoopProvider),
            Arc::new(Notifier::new()),
            Lang::Ar,
        )
    }

    fn fill_valid_form(session: &mut CheckoutSession) {
        session.form.set_field(FormField::Name, "محمد الحمادي");
        session.form.set_field(FormField::Phone, "771234567");
        session
            .form
            .set_field(FormField::Address, "حي الثورة، شارع الستين، جوار الجامع");
        session.form.payment_method = Some(PaymentMethod::Cash);
    }

    fn cart_line() -> CartLine {
        CartLine {
            id: "l1".to_string(),
            item_id: "apple".to_string(),
            name: LocalizedText::new("تفاح", "Apples"),
            unit_type: shared::models::UnitType::Piece,
            quantity: 2,
            weight: None,
            addons: Default::default(),
            price_per_unit: None,
            local_price: 5.0,
        }
    }

    #[tokio::test]
    async fn every_gate_reports_before_submission() {
        let store = Arc::new(MemoryStore::new());
        let session = session_with(store);
        let errors = session.validation_errors(now_millis());

        let codes: Vec<ErrorCode> = errors.iter().map(|e| e.code).collect();
        assert!(codes.contains(&ErrorCode::CartEmpty));
        assert!(codes.contains(&ErrorCode::NameInvalid));
        assert!(codes.contains(&ErrorCode::PhoneInvalid));
        assert!(codes.contains(&ErrorCode::AddressInvalid));
        assert!(codes.contains(&ErrorCode::PaymentMethodUnavailable));
        assert!(codes.contains(&ErrorCode::ZoneNotSelected));
    }

    #[tokio::test]
    async fn coordinate_is_required_even_with_full_address() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_with(store);
        session.set_zones(vec![zone("z1", true, 15.0, 2000.0)]);
        session.set_payment_config(PaymentConfig {
            enabled_methods: vec![PaymentMethod::Cash],
            targets: vec![],
        });
        session.set_cart(vec![cart_line()]);
        fill_valid_form(&mut session);
        session.select_zone("z1").unwrap();

        let codes: Vec<ErrorCode> = session
            .validation_errors(now_millis())
            .iter()
            .map(|e| e.code)
            .collect();
        assert_eq!(codes, vec![ErrorCode::LocationMissing]);
    }

    #[tokio::test]
    async fn mismatch_error_carries_formatted_distance() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_with(store);
        session.set_zones(vec![zone("z1", true, 15.0, 2000.0)]);
        session.set_payment_config(PaymentConfig {
            enabled_methods: vec![PaymentMethod::Cash],
            targets: vec![],
        });
        session.set_cart(vec![cart_line()]);
        fill_valid_form(&mut session);
        session.select_zone("z1").unwrap();
        // ~3000 m north of the zone center
        session.set_manual_location(Coordinate::new(15.0 + 3000.0 / 111_195.0, 44.0));

        let errors = session.validation_errors(now_millis());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::ZoneMismatch);
        assert!(errors[0].message.contains("3.0 كم"), "{}", errors[0].message);
    }

    #[tokio::test]
    async fn detection_announces_zone_once() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(Notifier::new());
        let mut session = CheckoutSession::new(
            store,
            Arc::new(NoopProvider),
            notifier.clone(),
            Lang::Ar,
        );
        session.set_zones(vec![zone("z1", true, 15.0, 2000.0)]);

        session.detect_location().await.unwrap();
        let notices = notifier.drain();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("حدة"), "{}", notices[0].message);

        // Selecting the same zone again via detection does not re-announce
        session.detect_location().await.unwrap();
        assert!(notifier.drain().is_empty());
    }
}
