//! Unified error codes for the Dukkan client core
//!
//! This module defines all error codes used across the checkout and
//! settlement crates. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Form validation errors
//! - 2xxx: Permission errors
//! - 3xxx: Checkout errors
//! - 4xxx: Order errors
//! - 5xxx: Location errors
//! - 6xxx: Ledger errors
//! - 7xxx: Settlement errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Form Validation ====================
    /// Customer name is malformed
    NameInvalid = 1001,
    /// Phone number is not a valid Yemeni mobile number
    PhoneInvalid = 1002,
    /// Address text is out of bounds
    AddressInvalid = 1003,
    /// Scheduled delivery time is not in the future
    ScheduleInPast = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Checkout ====================
    /// Cart has no lines
    CartEmpty = 3001,
    /// No delivery zone selected
    ZoneNotSelected = 3002,
    /// Selected delivery zone is inactive
    ZoneInactive = 3003,
    /// No geolocation coordinate captured
    LocationMissing = 3004,
    /// Captured coordinate is outside the selected zone
    ZoneMismatch = 3005,
    /// Payment method is not enabled or has no valid target
    PaymentMethodUnavailable = 3006,
    /// Payment proof required but missing
    PaymentProofMissing = 3007,
    /// Payment proof supplied for a method that forbids it
    PaymentProofNotAllowed = 3008,
    /// No bank/recipient target resolved for the payment method
    PaymentTargetMissing = 3009,

    // ==================== 4xxx: Order ====================
    /// Remote store rejected the order
    OrderRejected = 4001,

    // ==================== 5xxx: Location ====================
    /// Geolocation permission denied
    LocationPermissionDenied = 5001,
    /// Geolocation request timed out
    LocationTimeout = 5002,
    /// Geolocation unavailable for another reason
    LocationUnavailable = 5003,

    // ==================== 6xxx: Ledger ====================
    /// A debit and a credit open item must both be selected
    OpenItemPairRequired = 6001,
    /// Open item not found in the loaded working set
    OpenItemNotFound = 6002,
    /// Allocation links open items with different currencies
    CurrencyMismatch = 6101,
    /// Allocation amount is zero or negative
    AmountNotPositive = 6102,
    /// Allocation amount exceeds an item's remaining open amount
    AmountExceedsOpen = 6103,

    // ==================== 7xxx: Settlement ====================
    /// Remote store rejected the settlement
    SettlementRejected = 7001,
    /// Settlement submitted with no allocations
    SettlementEmpty = 7002,
    /// Reversal requires a non-empty reason
    ReasonRequired = 7003,

    // ==================== 9xxx: System ====================
    /// Remote store rejected the request with an opaque error
    RemoteRejected = 9001,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout (client-side watchdog)
    TimeoutError = 9004,
    /// Response decoding failed at the store boundary
    DecodeError = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Form validation
            ErrorCode::NameInvalid => {
                "Name must be 3-50 Arabic or Latin letters and spaces"
            }
            ErrorCode::PhoneInvalid => {
                "Phone must start with 77, 73, 71 or 70 followed by 7 digits"
            }
            ErrorCode::AddressInvalid => "Address must be 10-200 characters",
            ErrorCode::ScheduleInPast => "Scheduled delivery time must be in the future",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Checkout
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::ZoneNotSelected => "No delivery zone selected",
            ErrorCode::ZoneInactive => "Selected delivery zone is inactive",
            ErrorCode::LocationMissing => "A map location must be captured before checkout",
            ErrorCode::ZoneMismatch => "Location is outside the selected delivery zone",
            ErrorCode::PaymentMethodUnavailable => "Payment method is not available",
            ErrorCode::PaymentProofMissing => {
                "A transfer reference or receipt screenshot is required"
            }
            ErrorCode::PaymentProofNotAllowed => "Cash payment must not carry payment proof",
            ErrorCode::PaymentTargetMissing => "No payment target available for this method",

            // Order
            ErrorCode::OrderRejected => "Order creation was rejected",

            // Location
            ErrorCode::LocationPermissionDenied => "Location permission was denied",
            ErrorCode::LocationTimeout => "Location request timed out",
            ErrorCode::LocationUnavailable => "Location is unavailable",

            // Ledger
            ErrorCode::OpenItemPairRequired => "Select both a debit and a credit open item",
            ErrorCode::OpenItemNotFound => "Open item not found",
            ErrorCode::CurrencyMismatch => "Open items have different currencies",
            ErrorCode::AmountNotPositive => "Allocation amount must be positive",
            ErrorCode::AmountExceedsOpen => "Allocation amount exceeds the remaining open amount",

            // Settlement
            ErrorCode::SettlementRejected => "Settlement creation was rejected",
            ErrorCode::SettlementEmpty => "Settlement has no allocations",
            ErrorCode::ReasonRequired => "A reversal reason is required",

            // System
            ErrorCode::RemoteRejected => "Remote store rejected the request",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::DecodeError => "Invalid response from the remote store",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Form validation
            1001 => Ok(ErrorCode::NameInvalid),
            1002 => Ok(ErrorCode::PhoneInvalid),
            1003 => Ok(ErrorCode::AddressInvalid),
            1004 => Ok(ErrorCode::ScheduleInPast),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Checkout
            3001 => Ok(ErrorCode::CartEmpty),
            3002 => Ok(ErrorCode::ZoneNotSelected),
            3003 => Ok(ErrorCode::ZoneInactive),
            3004 => Ok(ErrorCode::LocationMissing),
            3005 => Ok(ErrorCode::ZoneMismatch),
            3006 => Ok(ErrorCode::PaymentMethodUnavailable),
            3007 => Ok(ErrorCode::PaymentProofMissing),
            3008 => Ok(ErrorCode::PaymentProofNotAllowed),
            3009 => Ok(ErrorCode::PaymentTargetMissing),

            // Order
            4001 => Ok(ErrorCode::OrderRejected),

            // Location
            5001 => Ok(ErrorCode::LocationPermissionDenied),
            5002 => Ok(ErrorCode::LocationTimeout),
            5003 => Ok(ErrorCode::LocationUnavailable),

            // Ledger
            6001 => Ok(ErrorCode::OpenItemPairRequired),
            6002 => Ok(ErrorCode::OpenItemNotFound),
            6101 => Ok(ErrorCode::CurrencyMismatch),
            6102 => Ok(ErrorCode::AmountNotPositive),
            6103 => Ok(ErrorCode::AmountExceedsOpen),

            // Settlement
            7001 => Ok(ErrorCode::SettlementRejected),
            7002 => Ok(ErrorCode::SettlementEmpty),
            7003 => Ok(ErrorCode::ReasonRequired),

            // System
            9001 => Ok(ErrorCode::RemoteRejected),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9006 => Ok(ErrorCode::DecodeError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NameInvalid.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::ZoneMismatch.code(), 3005);
        assert_eq!(ErrorCode::OrderRejected.code(), 4001);
        assert_eq!(ErrorCode::LocationTimeout.code(), 5002);
        assert_eq!(ErrorCode::CurrencyMismatch.code(), 6101);
        assert_eq!(ErrorCode::SettlementRejected.code(), 7001);
        assert_eq!(ErrorCode::TimeoutError.code(), 9004);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::ZoneMismatch.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(3005), Ok(ErrorCode::ZoneMismatch));
        assert_eq!(ErrorCode::try_from(6103), Ok(ErrorCode::AmountExceedsOpen));
        assert_eq!(ErrorCode::try_from(9004), Ok(ErrorCode::TimeoutError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_u16() {
        let json = serde_json::to_string(&ErrorCode::ZoneMismatch).unwrap();
        assert_eq!(json, "3005");

        let code: ErrorCode = serde_json::from_str("6101").unwrap();
        assert_eq!(code, ErrorCode::CurrencyMismatch);
    }

    #[test]
    fn test_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::PhoneInvalid,
            ErrorCode::ZoneMismatch,
            ErrorCode::AmountExceedsOpen,
            ErrorCode::TimeoutError,
        ];

        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("1234");
        assert!(result.is_err());
    }
}
