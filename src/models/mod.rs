//! Core data models for papers, search queries and agent selections.

mod citation;
mod paper;
mod search;

pub use citation::{SelectedCitation, Task};
pub use paper::{
    clean_text, normalize_doi, normalize_title_key, MergeKey, Paper, PaperBuilder, SourceType,
};
pub use search::{SearchQuery, DEFAULT_MAX_RESULTS};
