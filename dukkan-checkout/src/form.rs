//! Checkout form state and field validation
//!
//! Centralized field limits and validation functions. Field updates go
//! through a value-level setter `(field, value)` — no synthetic UI events.
//! Validation messages are localized and field-tagged; they never reach
//! the remote store.

use shared::error::{AppError, ErrorCode};
use shared::locale::{Lang, localized};
use shared::models::{PaymentMethod, PaymentProof};
use shared::types::Timestamp;

// ── Field limits ────────────────────────────────────────────────────

/// Customer name length bounds (characters, not bytes)
pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 50;

/// Address length bounds (characters)
pub const MIN_ADDRESS_LEN: usize = 10;
pub const MAX_ADDRESS_LEN: usize = 200;

/// Yemeni mobile prefixes accepted at checkout
pub const PHONE_PREFIXES: [&str; 4] = ["77", "73", "71", "70"];

/// Digits following the two-digit prefix
pub const PHONE_SUFFIX_LEN: usize = 7;

// ── Validation helpers ──────────────────────────────────────────────

fn field_error(code: ErrorCode, lang: Lang, field: &str) -> AppError {
    AppError::with_message(code, localized(code, lang)).with_detail("field", field)
}

/// Customer name: 3-50 Arabic/Latin letters and spaces only
pub fn validate_customer_name(name: &str, lang: Lang) -> Result<(), AppError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(field_error(ErrorCode::NameInvalid, lang, "name"));
    }
    let valid_chars = trimmed.chars().all(|c| {
        c == ' '
            || c.is_ascii_alphabetic()
            || matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}')
    });
    if !valid_chars {
        return Err(field_error(ErrorCode::NameInvalid, lang, "name"));
    }
    Ok(())
}

/// Phone: a Yemeni mobile prefix (77/73/71/70) followed by exactly 7 digits
pub fn validate_phone(phone: &str, lang: Lang) -> Result<(), AppError> {
    let trimmed = phone.trim();
    let valid = trimmed.len() == 2 + PHONE_SUFFIX_LEN
        && PHONE_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        && trimmed.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(field_error(ErrorCode::PhoneInvalid, lang, "phone"));
    }
    Ok(())
}

/// Address text: 10-200 characters
pub fn validate_address(address: &str, lang: Lang) -> Result<(), AppError> {
    let len = address.trim().chars().count();
    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&len) {
        return Err(field_error(ErrorCode::AddressInvalid, lang, "address"));
    }
    Ok(())
}

/// Payment proof rules per method: transfer methods require proof, cash
/// must not carry any
pub fn validate_payment_proof(
    method: PaymentMethod,
    proof: &PaymentProof,
    lang: Lang,
) -> Result<(), AppError> {
    if method.requires_proof() {
        if !proof.is_present() {
            return Err(field_error(ErrorCode::PaymentProofMissing, lang, "payment"));
        }
    } else if proof.is_present() {
        return Err(field_error(
            ErrorCode::PaymentProofNotAllowed,
            lang,
            "payment",
        ));
    }
    Ok(())
}

/// Scheduled delivery must be strictly in the future
pub fn validate_schedule(scheduled_at: Timestamp, now: Timestamp, lang: Lang) -> Result<(), AppError> {
    if scheduled_at <= now {
        return Err(field_error(ErrorCode::ScheduleInPast, lang, "scheduled_at"));
    }
    Ok(())
}

// ── Form state ──────────────────────────────────────────────────────

/// Text fields addressable by the value-level setter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Phone,
    Address,
    Notes,
    CouponCode,
}

/// Checkout form working state
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub notes: String,
    pub coupon_code: String,
    pub payment_method: Option<PaymentMethod>,
    pub payment_target_id: Option<String>,
    pub payment_proof: PaymentProof,
    pub redeem_points: bool,
    /// Scheduled delivery time; immediate delivery when unset
    pub scheduled_at: Option<Timestamp>,
}

impl CheckoutForm {
    /// Value-level field update, decoupled from any UI event type
    pub fn set_field(&mut self, field: FormField, value: &str) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Phone => &mut self.phone,
            FormField::Address => &mut self.address,
            FormField::Notes => &mut self.notes,
            FormField::CouponCode => &mut self.coupon_code,
        };
        *slot = value.to_string();
    }
}
