//! # Citation Agent
//!
//! Finds real academic papers that support a natural-language claim.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, SelectedCitation, etc.)
//! - [`sources`]: Bibliographic source adapters behind the [`Source`] trait
//! - [`retrieval`]: Concurrent multi-source search with merge and ranking
//! - [`agent`]: The tool-using agent loop and its language-model client
//! - [`utils`]: HTTP client, merging and bibliography formatting
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal output used by the CLI

pub mod agent;
pub mod config;
pub mod models;
pub mod retrieval;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use agent::{AgentOutcome, CitationAgent};
pub use models::{Paper, SelectedCitation};
pub use retrieval::RetrievalService;
pub use sources::{Source, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
