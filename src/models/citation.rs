//! Citations selected by the agent, and the agent's working task list.

use serde::{Deserialize, Serialize};

use super::Paper;

/// A paper the agent chose as evidence, with the model's justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCitation {
    pub title: String,
    pub authors: Vec<String>,
    /// DOI resolver URL when the DOI is known, else the source page
    pub url: String,
    /// Free text supplied by the model explaining the support
    pub excerpt: String,
    pub citation_count: u32,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl SelectedCitation {
    pub fn from_paper(paper: &Paper, excerpt: impl Into<String>) -> Self {
        Self {
            title: paper.title().to_string(),
            authors: paper.authors.clone(),
            url: paper.resolved_url(),
            excerpt: excerpt.into(),
            citation_count: paper.citation_count,
            source: paper.source.clone(),
            doi: paper.doi.clone(),
            year: paper.year,
        }
    }
}

/// An entry in the agent's self-managed task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Sequential, starting at 1
    pub id: u32,
    pub description: String,
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaperBuilder, SourceType};

    #[test]
    fn test_citation_url_prefers_doi() {
        let paper = PaperBuilder::new("T", "https://www.semanticscholar.org/p/1", &SourceType::SemanticScholar)
            .doi("10.9/abc")
            .citations(7)
            .build();
        let citation = SelectedCitation::from_paper(&paper, "supports it");

        assert_eq!(citation.url, "https://doi.org/10.9/abc");
        assert_eq!(citation.citation_count, 7);
        assert_eq!(citation.excerpt, "supports it");
        assert_eq!(citation.source, "Semantic Scholar");
    }
}
