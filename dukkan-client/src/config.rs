//! Client configuration

/// Configuration for connecting to the remote store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store base URL (e.g., "https://api.dukkan.example")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl StoreConfig {
    /// Create a new store configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an HTTP remote store from this configuration
    pub fn build(&self) -> super::HttpRemoteStore {
        super::HttpRemoteStore::new(self)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
