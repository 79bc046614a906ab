//! Shared types for the Dukkan client core
//!
//! Common types used across the workspace crates: data models, the unified
//! error system, localization helpers, the notification service, and money
//! conversion utilities.

pub mod error;
pub mod locale;
pub mod logging;
pub mod models;
pub mod money;
pub mod notify;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use locale::{Lang, LocalizedText};
pub use notify::{Notice, NoticeKind, Notifier};
pub use response::ApiResponse;
pub use types::{Capability, Timestamp};
