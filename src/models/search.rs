//! Search request model.

use serde::{Deserialize, Serialize};

/// Default number of results requested from each source
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Search query parameters handed to every source adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search query
    pub query: String,

    /// Maximum number of results per source
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_builder() {
        let query = SearchQuery::new("machine learning").max_results(3);
        assert_eq!(query.query, "machine learning");
        assert_eq!(query.max_results, 3);
        assert_eq!(SearchQuery::new("x").max_results, DEFAULT_MAX_RESULTS);
    }
}
