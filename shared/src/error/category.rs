//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Form validation errors
/// - 2xxx: Permission errors
/// - 3xxx: Checkout errors
/// - 4xxx: Order errors
/// - 5xxx: Location errors
/// - 6xxx: Ledger errors
/// - 7xxx: Settlement errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Form validation errors (1xxx)
    Validation,
    /// Permission errors (2xxx)
    Permission,
    /// Checkout errors (3xxx)
    Checkout,
    /// Order errors (4xxx)
    Order,
    /// Location errors (5xxx)
    Location,
    /// Ledger errors (6xxx)
    Ledger,
    /// Settlement errors (7xxx)
    Settlement,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Validation,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Checkout,
            4000..5000 => Self::Order,
            5000..6000 => Self::Location,
            6000..7000 => Self::Ledger,
            7000..8000 => Self::Settlement,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Validation => "validation",
            Self::Permission => "permission",
            Self::Checkout => "checkout",
            Self::Order => "order",
            Self::Location => "location",
            Self::Ledger => "ledger",
            Self::Settlement => "settlement",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Validation);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3005), ErrorCategory::Checkout);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5002), ErrorCategory::Location);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Ledger);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Settlement);
        assert_eq!(ErrorCategory::from_code(9004), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::PhoneInvalid.category(), ErrorCategory::Validation);
        assert_eq!(ErrorCode::ZoneMismatch.category(), ErrorCategory::Checkout);
        assert_eq!(
            ErrorCode::CurrencyMismatch.category(),
            ErrorCategory::Ledger
        );
        assert_eq!(
            ErrorCode::SettlementRejected.category(),
            ErrorCategory::Settlement
        );
        assert_eq!(ErrorCode::TimeoutError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Checkout).unwrap();
        assert_eq!(json, "\"checkout\"");

        let category: ErrorCategory = serde_json::from_str("\"ledger\"").unwrap();
        assert_eq!(category, ErrorCategory::Ledger);
    }
}
