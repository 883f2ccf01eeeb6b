//! HTTP client utilities.

use reqwest::Client;
use std::time::Duration;

use crate::error::{FreidokError, Result};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP client with the crate's defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the default user agent
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_user_agent(USER_AGENT, timeout)
    }

    /// Create a client with a custom user agent
    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .gzip(true)
            .build()
            .map_err(|e| FreidokError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
