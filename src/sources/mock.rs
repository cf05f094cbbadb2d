//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::models::{Paper, PaperBuilder, SearchQuery, SourceType};
use crate::sources::{Source, SourceError};

#[derive(Debug, Clone)]
enum MockResponse {
    Papers(Vec<Paper>),
    Failure(String),
}

/// A mock source for testing that returns predefined responses.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    response: Mutex<MockResponse>,
    queries: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a new mock source that finds nothing.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_papers(id, Vec::new())
    }

    /// Create a mock source that always returns `papers`.
    pub fn with_papers(id: impl Into<String>, papers: Vec<Paper>) -> Self {
        Self {
            id: id.into(),
            response: Mutex::new(MockResponse::Papers(papers)),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock source whose every search fails with a network error.
    pub fn failing(id: impl Into<String>) -> Self {
        let id = id.into();
        let message = format!("{} is unreachable", id);
        Self {
            id,
            response: Mutex::new(MockResponse::Failure(message)),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Set the papers to return.
    pub fn set_papers(&self, papers: Vec<Paper>) {
        *lock(&self.response) = MockResponse::Papers(papers);
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        lock(&self.queries).push(query.query.clone());
        match &*lock(&self.response) {
            MockResponse::Papers(papers) => Ok(papers.clone()),
            MockResponse::Failure(message) => Err(SourceError::Network(message.clone())),
        }
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(title: &str, doi: Option<&str>, source_type: &SourceType) -> Paper {
    let url = format!("http://example.com/{}", crate::models::normalize_title_key(title));
    let builder = PaperBuilder::new(title, url, source_type).authors(["A. Author"]);
    match doi {
        Some(doi) => builder.doi(doi).build(),
        None => builder.build(),
    }
}
