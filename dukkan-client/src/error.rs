//! Client error types

use shared::error::ErrorCode;
use shared::locale::{self, Lang};
use thiserror::Error;

/// Remote store error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response decoding failed at the boundary
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store processed the request and said no (business rejection).
    /// The raw backend message is kept for the localized surface heuristic.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Client-side watchdog fired before the store answered.
    /// The underlying call is not aborted server-side; the client only
    /// stops waiting.
    #[error("Request timed out")]
    Timeout,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// User-facing localized text for this error.
    ///
    /// Rejections pass the raw backend message through the Arabic-script
    /// preference heuristic; timeouts get their own distinct message so the
    /// user can tell "backend said no" from "backend didn't answer".
    pub fn surface(&self, lang: Lang) -> String {
        match self {
            StoreError::Rejected(raw) | StoreError::Forbidden(raw) => {
                locale::surface_remote_message(raw, lang)
            }
            StoreError::Timeout => locale::localized(ErrorCode::TimeoutError, lang).to_string(),
            StoreError::Http(_) => locale::localized(ErrorCode::NetworkError, lang).to_string(),
            StoreError::Decode(_) | StoreError::Serialization(_) => {
                locale::localized(ErrorCode::DecodeError, lang).to_string()
            }
            StoreError::Unauthorized | StoreError::NotFound(_) => {
                locale::localized(ErrorCode::RemoteRejected, lang).to_string()
            }
        }
    }
}

/// Result type for remote store operations
pub type StoreResult<T> = Result<T, StoreError>;
