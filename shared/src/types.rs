//! Common types for the shared crate
//!
//! Utility types used across the workspace

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Capability type — a permission string checked against the remote store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability(pub String);

impl Capability {
    /// Check if this capability grants access to the given action
    pub fn grants(&self, action: &str) -> bool {
        if self.0 == "*" {
            return true;
        }
        if self.0.ends_with(":*") {
            let prefix = &self.0[..self.0.len() - 2];
            return action.starts_with(prefix);
        }
        self.0 == action
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
