//! arXiv research source implementation.

use async_trait::async_trait;
use chrono::Datelike;
use serde::Deserialize;

use crate::models::{Paper, PaperBuilder, SearchQuery, SourceType};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv research source
///
/// arXiv does not report citation counts, so every paper carries 0.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, ARXIV_API_URL)
    }

    /// Create against a different endpoint (mirrors, tests)
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn build_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?search_query={}&start=0&max_results={}",
            self.base_url,
            urlencoding::encode(&format!("all:{}", query.query)),
            query.max_results
        )
    }

    /// Parse an arXiv Atom feed into papers
    pub fn parse_feed(xml: &str) -> Result<Vec<Paper>, SourceError> {
        let feed: AtomFeed = quick_xml::de::from_str(xml)?;

        Ok(feed
            .entries
            .iter()
            // arXiv reports query errors as a feed entry under /api/errors
            .filter(|e| !e.id.contains("/api/errors"))
            .map(Self::parse_entry)
            .collect())
    }

    fn parse_entry(entry: &AtomEntry) -> Paper {
        let mut builder = PaperBuilder::new(&entry.title, entry.id.trim(), &SourceType::Arxiv)
            .authors(entry.authors.iter().map(|a| a.name.as_str()))
            .abstract_text(&entry.summary);

        if let Some(pdf) = Self::find_pdf_link(&entry.links) {
            builder = builder.pdf_url(pdf);
        }

        if let Some(doi) = &entry.doi {
            builder = builder.doi(&doi.value);
        }

        if let Some(year) = entry
            .published
            .as_deref()
            .and_then(|d| chrono::DateTime::parse_from_rfc3339(d.trim()).ok())
            .map(|d| d.year())
        {
            builder = builder.year(year);
        }

        builder.build()
    }

    /// arXiv lists several links per entry; the PDF one is titled "pdf"
    /// (or typed application/pdf on the "related" relation).
    fn find_pdf_link(links: &[AtomLink]) -> Option<&str> {
        links
            .iter()
            .find(|l| l.title.as_deref() == Some("pdf"))
            .or_else(|| {
                links.iter().find(|l| {
                    l.rel.as_deref() == Some("related")
                        && l.media_type.as_deref() == Some("application/pdf")
                })
            })
            .map(|l| l.href.as_str())
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        SourceType::Arxiv.id()
    }

    fn name(&self) -> &str {
        SourceType::Arxiv.name()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("Empty query".to_string()));
        }

        let response = self
            .client
            .get(&self.build_url(query))
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let mut papers = Self::parse_feed(&body)?;
        papers.truncate(query.max_results);
        Ok(papers)
    }
}

// ===== arXiv Atom feed types =====

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "arxiv:doi", alias = "doi", default)]
    doi: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@title", default)]
    title: Option<String>,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
    #[serde(rename = "@type", default)]
    media_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}
