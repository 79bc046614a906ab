//! Dukkan Client - HTTP client for the remote store
//!
//! Provides the [`RemoteStore`] contract consumed by the checkout and
//! settlement crates, plus the network-backed implementation. The remote
//! store is the single source of truth: every balance-affecting operation
//! is one atomic call, and the client never writes derived state back.

pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "in-process")]
pub mod memory;
pub mod store;
pub mod timeout;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use http::HttpRemoteStore;
pub use store::{BackfillResult, RemoteStore};
pub use timeout::{SETTLEMENT_CALL_TIMEOUT, with_timeout};
