//! Terminal output for the CLI: colored status lines, spinners and tables.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::agent::AgentOutcome;
use crate::models::Paper;

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Source icons for the built-in sources.
pub fn source_icon(source: &str) -> &'static str {
    match source.to_lowercase().as_str() {
        "arxiv" => "📝",
        "semantic" | "semantic scholar" => "🧠",
        _ => "📄",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Print a styled status message to stderr.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => eprintln!("{} {}", icon.cyan().bold(), msg),
        Status::Search => eprintln!("{} {}", icon.yellow(), msg),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

fn spinner_style(template: &str, ticks: &str) -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template(template)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
        .tick_chars(ticks)
}

/// Print a loading spinner with message.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message; hidden when `quiet`.
    pub fn new(msg: &str, quiet: bool) -> Self {
        let pb = if quiet || !std::io::stderr().is_terminal() {
            indicatif::ProgressBar::hidden()
        } else {
            indicatif::ProgressBar::new_spinner()
        };
        pb.set_style(spinner_style("{spinner:.cyan} {msg}", "⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Finish with success message.
    pub fn finish_with_success(&self, msg: &str) {
        self.pb.set_style(spinner_style("{spinner:.green} {msg}", "✓✓"));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Finish with error message.
    pub fn finish_with_error(&self, msg: &str) {
        self.pb.set_style(spinner_style("{spinner:.red} {msg}", "✗✗"));
        self.pb.finish_with_message(msg.to_string());
    }
}

/// Shorten for a table cell, counting characters
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}

fn authors_cell(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [first, ..] => format!("{} et al.", first),
    }
}

/// Table of the agent's citations, most-cited first
pub fn citations_table(outcome: &AgentOutcome) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Title", "Authors", "Year", "Citations", "Excerpt"]);

    for (i, citation) in outcome.citations.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(ellipsize(&citation.title, 60)).add_attribute(Attribute::Bold),
            Cell::new(ellipsize(&authors_cell(&citation.authors), 30)),
            Cell::new(citation.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(citation.citation_count),
            Cell::new(ellipsize(&citation.excerpt, 80)),
        ]);
    }
    table
}

/// Table of merged search results
pub fn papers_table(papers: &[Paper]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Title", "Authors", "Year", "Citations", "Source", "PDF"]);

    for paper in papers {
        table.add_row(vec![
            Cell::new(ellipsize(paper.title(), 60)).add_attribute(Attribute::Bold),
            Cell::new(ellipsize(&authors_cell(&paper.authors), 30)),
            Cell::new(paper.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(paper.citation_count),
            Cell::new(&paper.source),
            Cell::new(if paper.has_pdf() { "yes" } else { "" }),
        ]);
    }
    table
}

/// Print each citation's link under the table.
pub fn print_citation_links(outcome: &AgentOutcome) {
    for (i, citation) in outcome.citations.iter().enumerate() {
        println!(
            "  {} {} {}",
            format!("[{}]", i + 1).dimmed(),
            source_icon(&citation.source),
            citation.url.blue()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("a long paper title", 10), "a long ...");
        assert_eq!(ellipsize("ünïcödé ünïcödé", 8), "ünïcö...");
    }

    #[test]
    fn test_authors_cell() {
        assert_eq!(authors_cell(&[]), "");
        assert_eq!(authors_cell(&["A".to_string(), "B".to_string()]), "A et al.");
    }
}
