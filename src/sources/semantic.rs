//! Semantic Scholar research source implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Paper, PaperBuilder, SearchQuery, SourceType};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested from the paper search endpoint
const SEARCH_FIELDS: &str = "title,authors,url,citationCount,externalIds,abstract,year,openAccessPdf";

/// Semantic Scholar research source
///
/// Uses the Semantic Scholar Graph API. An API key is optional and only
/// raises the rate limit.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarSource {
    /// Create a new Semantic Scholar source
    pub fn new(client: HttpClient, api_key: Option<String>) -> Self {
        Self::with_base_url(client, SEMANTIC_API_BASE, api_key)
    }

    /// Create against a different endpoint (tests, proxies)
    pub fn with_base_url(
        client: HttpClient,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn build_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/paper/search?query={}&limit={}&fields={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.max_results,
            SEARCH_FIELDS
        )
    }

    /// Add API key to request headers if available
    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    /// Parse Semantic Scholar paper data; records with neither a title nor a
    /// DOI are skipped
    fn parse_paper(data: S2Paper) -> Option<Paper> {
        let title = data.title.unwrap_or_default();
        let doi = data
            .external_ids
            .and_then(|ids| ids.doi)
            .filter(|d| !d.trim().is_empty());
        if title.trim().is_empty() && doi.is_none() {
            return None;
        }

        let mut builder = PaperBuilder::new(
            title,
            data.url.unwrap_or_default(),
            &SourceType::SemanticScholar,
        )
        .authors(data.authors.into_iter().filter_map(|a| a.name))
        .abstract_text(data.r#abstract.unwrap_or_default())
        .citations(data.citation_count.unwrap_or(0));

        if let Some(doi) = doi {
            builder = builder.doi(doi);
        }

        if let Some(pdf) = data.open_access_pdf.and_then(|p| p.url) {
            builder = builder.pdf_url(pdf);
        }

        if let Some(year) = data.year {
            builder = builder.year(year);
        }

        Some(builder.build())
    }

    /// Parse a paper search response body
    pub fn parse_response(body: &str) -> Result<Vec<Paper>, SourceError> {
        let data: S2SearchResponse = serde_json::from_str(body)?;
        Ok(data.data.into_iter().filter_map(Self::parse_paper).collect())
    }
}

#[async_trait]
impl Source for SemanticScholarSource {
    fn id(&self) -> &str {
        SourceType::SemanticScholar.id()
    }

    fn name(&self) -> &str {
        SourceType::SemanticScholar.name()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("Empty query".to_string()));
        }

        let response = self
            .add_api_key_if_present(self.client.get(&self.build_url(query)))
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search Semantic Scholar: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Semantic Scholar API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let mut papers = Self::parse_response(&body)?;
        papers.truncate(query.max_results);
        Ok(papers)
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    title: Option<String>,
    r#abstract: Option<String>,
    year: Option<i32>,
    citation_count: Option<u32>,
    #[serde(default)]
    authors: Vec<S2Author>,
    url: Option<String>,
    external_ids: Option<S2ExternalIds>,
    open_access_pdf: Option<S2OpenAccessPdf>,
}

#[derive(Debug, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2OpenAccessPdf {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default)]
    data: Vec<S2Paper>,
}
