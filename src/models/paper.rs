//! Paper model representing a research paper from any source.

use serde::Serialize;
use std::fmt;

/// The source/repository where the paper was found
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceType {
    Arxiv,
    SemanticScholar,
    Other(String),
}

impl SourceType {
    /// Returns the display name of the source, used as the provenance label
    pub fn name(&self) -> &str {
        match self {
            SourceType::Arxiv => "arXiv",
            SourceType::SemanticScholar => "Semantic Scholar",
            SourceType::Other(s) => s,
        }
    }

    /// Returns the source identifier (for configuration)
    pub fn id(&self) -> &str {
        match self {
            SourceType::Arxiv => "arxiv",
            SourceType::SemanticScholar => "semantic",
            SourceType::Other(s) => s,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identity used to decide whether two records describe the same work.
///
/// A DOI always wins over the normalized title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Doi(String),
    Title(String),
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeKey::Doi(doi) => write!(f, "doi:{}", doi),
            MergeKey::Title(key) => write!(f, "title:{}", key),
        }
    }
}

/// A research paper in the common shape every source adapter produces
///
/// The title is private so the derived `title_key` can never drift from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paper {
    title: String,

    /// Authors in byline order
    pub authors: Vec<String>,

    /// Paper page URL
    pub url: String,

    /// Direct PDF URL
    pub pdf_url: Option<String>,

    /// Provenance label; accumulates "arXiv, Semantic Scholar" when merged
    pub source: String,

    /// Citation count (0 when the source does not report one)
    pub citation_count: u32,

    /// Normalized Digital Object Identifier
    pub doi: Option<String>,

    /// Abstract text
    pub r#abstract: String,

    /// Publication year
    pub year: Option<i32>,

    #[serde(skip)]
    title_key: String,
}

impl Paper {
    /// Create a new paper with required fields
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: &SourceType) -> Self {
        let title = clean_text(&title.into());
        let title_key = normalize_title_key(&title);
        Self {
            title,
            authors: Vec::new(),
            url: url.into(),
            pdf_url: None,
            source: source.name().to_string(),
            citation_count: 0,
            doi: None,
            r#abstract: String::new(),
            year: None,
            title_key,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the title, recomputing the normalized key
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = clean_text(&title.into());
        self.title_key = normalize_title_key(&self.title);
    }

    /// Lowercased title with every non-alphanumeric character removed
    pub fn title_key(&self) -> &str {
        &self.title_key
    }

    /// DOI if present, else the normalized title. `None` means the paper
    /// cannot be identified and must not take part in merging.
    pub fn merge_key(&self) -> Option<MergeKey> {
        match self.doi.as_deref() {
            Some(doi) if !doi.is_empty() => Some(MergeKey::Doi(doi.to_string())),
            _ if !self.title_key.is_empty() => Some(MergeKey::Title(self.title_key.clone())),
            _ => None,
        }
    }

    /// Check if paper has a downloadable PDF
    pub fn has_pdf(&self) -> bool {
        self.pdf_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// DOI resolver URL when a DOI is known, else the source page URL
    pub fn resolved_url(&self) -> String {
        match self.doi.as_deref() {
            Some(doi) if !doi.is_empty() => format!("https://doi.org/{}", doi),
            _ => self.url.clone(),
        }
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder with required fields
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: &SourceType) -> Self {
        Self {
            paper: Paper::new(title, url, source),
        }
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paper.authors = authors
            .into_iter()
            .map(|a| {
                let a: String = a.into();
                a.trim().to_string()
            })
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.paper.r#abstract = clean_text(&abstract_text.into());
        self
    }

    /// Set DOI; blank values are ignored
    pub fn doi(mut self, doi: impl AsRef<str>) -> Self {
        self.paper.doi = normalize_doi(doi.as_ref());
        self
    }

    /// Set PDF URL; blank values are ignored
    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.paper.pdf_url = if url.trim().is_empty() {
            None
        } else {
            Some(url.trim().to_string())
        };
        self
    }

    /// Set citation count
    pub fn citations(mut self, count: u32) -> Self {
        self.paper.citation_count = count;
        self
    }

    /// Set publication year
    pub fn year(mut self, year: i32) -> Self {
        self.paper.year = Some(year);
        self
    }

    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}

/// Collapse multi-line feed text into a single trimmed line
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase and strip everything that is not a letter or digit
pub fn normalize_title_key(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Normalize a DOI: strip resolver prefixes, trim, lowercase. Blank input yields `None`.
pub fn normalize_doi(doi: &str) -> Option<String> {
    let mut doi = doi.trim();
    for prefix in [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi:",
    ] {
        if doi
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            doi = doi[prefix.len()..].trim();
            break;
        }
    }

    if doi.is_empty() {
        None
    } else {
        Some(doi.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_builder() {
        let paper = PaperBuilder::new("Test Paper", "https://example.com", &SourceType::Arxiv)
            .authors(["John Doe", "Jane Smith"])
            .abstract_text("This is a test abstract.")
            .doi("10.1234/TEST.1234")
            .pdf_url("https://example.com/paper.pdf")
            .citations(42)
            .build();

        assert_eq!(paper.title(), "Test Paper");
        assert_eq!(paper.authors, vec!["John Doe", "Jane Smith"]);
        assert_eq!(paper.doi.as_deref(), Some("10.1234/test.1234"));
        assert_eq!(paper.citation_count, 42);
        assert_eq!(paper.source, "arXiv");
        assert!(paper.has_pdf());
    }

    #[test]
    fn test_title_key_tracks_title() {
        let mut paper = Paper::new("Deep  Learning:\n A Survey", "u", &SourceType::Arxiv);
        assert_eq!(paper.title(), "Deep Learning: A Survey");
        assert_eq!(paper.title_key(), "deeplearningasurvey");

        paper.set_title("Attention Is All You Need");
        assert_eq!(paper.title_key(), "attentionisallyouneed");
    }

    #[test]
    fn test_merge_key_prefers_doi() {
        let with_doi = PaperBuilder::new("Some Title", "u", &SourceType::Arxiv)
            .doi("10.1/x")
            .build();
        assert_eq!(with_doi.merge_key(), Some(MergeKey::Doi("10.1/x".into())));

        let without_doi = Paper::new("Some Title", "u", &SourceType::Arxiv);
        assert_eq!(
            without_doi.merge_key(),
            Some(MergeKey::Title("sometitle".into()))
        );

        let anonymous = Paper::new("  --  ", "u", &SourceType::Arxiv);
        assert_eq!(anonymous.merge_key(), None);
    }

    #[test]
    fn test_normalize_doi() {
        assert_eq!(normalize_doi("https://doi.org/10.1/ABC"), Some("10.1/abc".into()));
        assert_eq!(normalize_doi(" doi:10.5/x "), Some("10.5/x".into()));
        assert_eq!(normalize_doi("   "), None);
    }

    #[test]
    fn test_resolved_url() {
        let paper = PaperBuilder::new("T", "https://arxiv.org/abs/1", &SourceType::Arxiv)
            .doi("10.1/x")
            .build();
        assert_eq!(paper.resolved_url(), "https://doi.org/10.1/x");

        let paper = Paper::new("T", "https://arxiv.org/abs/1", &SourceType::Arxiv);
        assert_eq!(paper.resolved_url(), "https://arxiv.org/abs/1");
    }
}
