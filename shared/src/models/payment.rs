//! Payment Models

use serde::{Deserialize, Serialize};

use crate::locale::LocalizedText;

/// Payment method enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery (الدفع عند الاستلام)
    Cash,
    /// Kuraimi bank transfer (حوالة الكريمي)
    Kuraimi,
    /// Exchange-network transfer (حوالة شبكة صرافة)
    Network,
}

impl PaymentMethod {
    /// Transfer methods require a reference number or receipt screenshot
    pub fn requires_proof(&self) -> bool {
        matches!(self, PaymentMethod::Kuraimi | PaymentMethod::Network)
    }
}

/// Kind of payment target resolved for a transfer method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    Bank,
    Recipient,
}

/// Bank account / recipient a transfer payment is addressed to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTarget {
    pub id: String,
    pub kind: TargetKind,
    pub name: LocalizedText,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_no: Option<String>,
    pub is_active: bool,
}

/// Proof of an already-made transfer
///
/// The screenshot itself is uploaded elsewhere; only its opaque id travels
/// with the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_id: Option<String>,
}

impl PaymentProof {
    /// Whether either proof field is populated
    pub fn is_present(&self) -> bool {
        self.reference_no.as_deref().is_some_and(|r| !r.trim().is_empty())
            || self.screenshot_id.is_some()
    }
}

/// The payment choice attached to an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method: PaymentMethod,
    /// Resolved bank/recipient target (required for transfer methods)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default)]
    pub proof: PaymentProof,
}

/// Store-side payment configuration consumed by checkout
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentConfig {
    /// Methods enabled by configuration
    pub enabled_methods: Vec<PaymentMethod>,
    /// All configured targets; checkout filters to active ones per method
    pub targets: Vec<PaymentTarget>,
}

impl PaymentConfig {
    /// Active targets available for the given method
    pub fn targets_for(&self, method: PaymentMethod) -> impl Iterator<Item = &PaymentTarget> {
        self.targets
            .iter()
            .filter(move |t| t.method == method && t.is_active)
    }

    /// A method is selectable when enabled and, for transfer methods,
    /// at least one active target exists
    pub fn method_available(&self, method: PaymentMethod) -> bool {
        if !self.enabled_methods.contains(&method) {
            return false;
        }
        if method.requires_proof() {
            return self.targets_for(method).next().is_some();
        }
        true
    }
}
