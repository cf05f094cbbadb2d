//! Bibliographic source adapters.
//!
//! Every adapter implements [`Source`]: it queries one external index and maps
//! that index's schema into the common [`Paper`] shape. Adapters are collected
//! in a [`SourceRegistry`], which the retrieval service fans out over.
//!
//! # Runtime Source Configuration
//!
//! - `CITATION_AGENT__SOURCES__ENABLED_SOURCES` - Only use these sources (e.g., "arxiv")
//! - `CITATION_AGENT__SOURCES__DISABLED_SOURCES` - Never use these sources
//!
//! `DISABLED_SOURCES` always takes precedence.

mod arxiv;
pub mod mock;
mod registry;
mod semantic;

pub use arxiv::ArxivSource;
pub use mock::MockSource;
pub use registry::SourceRegistry;
pub use semantic::SemanticScholarSource;

use crate::models::{Paper, SearchQuery};
use async_trait::async_trait;

/// The Source trait defines the interface for all bibliographic source adapters.
///
/// # Implementing a New Source
///
/// 1. Create a new struct that implements `Source`
/// 2. Implement `id`, `name`, and `search`
/// 3. Register it in `SourceRegistry::from_config` or dynamically with `register`
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (used in configuration, e.g., "arxiv")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for papers matching the query
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError>;

    /// Fail-soft search: errors are logged and become an empty list, and the
    /// result is capped at `query.max_results`.
    async fn search_or_empty(&self, query: &SearchQuery) -> Vec<Paper> {
        match self.search(query).await {
            Ok(mut papers) => {
                papers.truncate(query.max_results);
                tracing::debug!("{} returned {} papers", self.id(), papers.len());
                papers
            }
            Err(e) => {
                tracing::warn!("Search failed for {}: {}", self.id(), e);
                Vec::new()
            }
        }
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}
