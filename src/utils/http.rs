//! HTTP client utilities.

use reqwest::{Client, ClientBuilder, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a client honouring the configured timeouts and user agent
    pub fn from_config(config: &HttpConfig) -> Result<Self, SourceError> {
        Self::build(builder(config).timeout(Duration::from_secs(config.timeout_secs)))
    }

    /// Like [`HttpClient::from_config`] but with only a connect timeout,
    /// for calls whose duration is bounded elsewhere
    pub fn without_request_timeout(config: &HttpConfig) -> Result<Self, SourceError> {
        Self::build(builder(config))
    }

    fn build(builder: ClientBuilder) -> Result<Self, SourceError> {
        let client = builder
            .build()
            .map_err(|e| SourceError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Start a POST request
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }
}

fn builder(config: &HttpConfig) -> ClientBuilder {
    Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
}
