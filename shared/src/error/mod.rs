//! Unified error system for the Dukkan client core
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Form validation errors
//! - 2xxx: Permission errors
//! - 3xxx: Checkout errors
//! - 4xxx: Order errors
//! - 5xxx: Location errors
//! - 6xxx: Ledger errors
//! - 7xxx: Settlement errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::ZoneMismatch);
//!
//! // Create an error with details
//! let err = AppError::new(ErrorCode::ZoneMismatch)
//!     .with_detail("distance_m", 3000.0);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
