//! Multi-source retrieval: fan out, merge, rank.

use futures_util::future::join_all;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{Paper, SearchQuery, DEFAULT_MAX_RESULTS};
use crate::sources::{SourceError, SourceRegistry};
use crate::utils::merge_papers;

/// Runs one query against every registered source and returns the merged,
/// citation-ranked papers
#[derive(Debug, Clone)]
pub struct RetrievalService {
    registry: SourceRegistry,
    max_results_per_source: usize,
}

impl RetrievalService {
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry,
            max_results_per_source: DEFAULT_MAX_RESULTS,
        }
    }

    /// Build the service over the built-in sources allowed by `config`
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::new(SourceRegistry::from_config(config)?)
            .max_results_per_source(config.sources.max_results_per_source))
    }

    /// Cap on results requested from each source
    pub fn max_results_per_source(mut self, max: usize) -> Self {
        self.max_results_per_source = max;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Search every source concurrently, merge, and sort by citation count
    /// (descending; ties keep merge order).
    ///
    /// Never fails: a source that errors or panics contributes nothing, and an
    /// empty list means no evidence was found.
    pub async fn retrieve(&self, query: &str) -> Vec<Paper> {
        let search = SearchQuery::new(query.trim()).max_results(self.max_results_per_source);

        let handles = self.registry.all().map(|source| {
            let source = Arc::clone(source);
            let search = search.clone();
            tokio::spawn(async move { source.search_or_empty(&search).await })
        });

        let results: Vec<Vec<Paper>> = join_all(handles)
            .await
            .into_iter()
            .zip(self.registry.ids())
            .map(|(joined, id)| {
                joined.unwrap_or_else(|e| {
                    tracing::warn!("Search task for {} aborted: {}", id, e);
                    Vec::new()
                })
            })
            .collect();

        let raw_count: usize = results.iter().map(Vec::len).sum();
        tracing::info!(
            "Received {} raw results from {} sources for \"{}\". Merging...",
            raw_count,
            results.len(),
            search.query
        );

        let mut papers = merge_papers(results);
        papers.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
        papers
    }
}
