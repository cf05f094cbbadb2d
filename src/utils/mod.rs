//! Utility modules supporting retrieval and output.
//!
//! - [`merge_papers`]: Collapse per-source result lists into one list of unique papers
//! - [`reconcile`]: Combine two records of the same paper
//! - [`HttpClient`]: Shared HTTP client for the source adapters and the model client
//! - [`format_bibliography`]: Render selected citations in a bibliography style
//!
//! # Merging
//!
//! ```rust
//! use citation_agent::utils::merge_papers;
//! use citation_agent::models::Paper;
//!
//! # fn example(arxiv: Vec<Paper>, semantic: Vec<Paper>) {
//! // Papers sharing a DOI (or, without one, a normalized title) become one record
//! let unique = merge_papers(vec![arxiv, semantic]);
//! # }
//! ```

mod bibliography;
mod http;
mod merge;

pub use bibliography::{format_bibliography, format_bibliography_on, format_citation, CitationStyle};
pub use http::HttpClient;
pub use merge::{merge_papers, reconcile};
