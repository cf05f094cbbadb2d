//! Registry for managing research source plugins.

use std::sync::Arc;

use super::{ArxivSource, SemanticScholarSource, Source, SourceError};
use crate::config::Config;
use crate::utils::HttpClient;

/// Registry of the sources a search fans out to
///
/// Registration order is preserved: it is the order adapter results are
/// handed to the merger.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in source allowed by the configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::from_config(&config.http)?;
        let sources = &config.sources;
        let mut registry = Self::new();

        if sources.is_enabled("arxiv") {
            registry.register(Arc::new(match &sources.arxiv_base_url {
                Some(url) => ArxivSource::with_base_url(client.clone(), url),
                None => ArxivSource::new(client.clone()),
            }));
        }

        if sources.is_enabled("semantic") {
            let key = sources.resolved_semantic_scholar_key();
            registry.register(Arc::new(match &sources.semantic_scholar_base_url {
                Some(url) => SemanticScholarSource::with_base_url(client.clone(), url, key),
                None => SemanticScholarSource::new(client.clone(), key),
            }));
        }

        tracing::debug!("Registered sources: {:?}", registry.ids().collect::<Vec<_>>());
        Ok(registry)
    }

    /// Register a new source; a source with the same id is replaced in place
    pub fn register(&mut self, source: Arc<dyn Source>) {
        match self.sources.iter().position(|s| s.id() == source.id()) {
            Some(pos) => self.sources[pos] = source,
            None => self.sources.push(source),
        }
    }

    /// Builder-style registration
    pub fn with_source(mut self, source: Arc<dyn Source>) -> Self {
        self.register(source);
        self
    }

    /// Get a source by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Source>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    /// Get all registered sources, in registration order
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }

    /// Get all source IDs
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.id())
    }

    /// Check if a source exists
    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
