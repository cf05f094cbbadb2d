//! Bibliography formatting for selected citations.
//!
//! Supports APA, MLA, Chicago, IEEE and Harvard. Entries without a year use
//! the current year; Chicago and Harvard include an access date.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::SelectedCitation;

/// Bibliography style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    Apa,
    Mla,
    Chicago,
    /// Numbered entries
    Ieee,
    Harvard,
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationStyle::Apa => write!(f, "APA"),
            CitationStyle::Mla => write!(f, "MLA"),
            CitationStyle::Chicago => write!(f, "Chicago"),
            CitationStyle::Ieee => write!(f, "IEEE"),
            CitationStyle::Harvard => write!(f, "Harvard"),
        }
    }
}

/// Format one citation; `number` is the 1-based position in the list
pub fn format_citation(
    citation: &SelectedCitation,
    number: usize,
    style: CitationStyle,
    today: NaiveDate,
) -> String {
    let title = &citation.title;
    let source = &citation.source;
    let url = &citation.url;
    let year = citation.year.unwrap_or_else(|| today.year());

    match style {
        CitationStyle::Apa => {
            format!("{} ({}). {}. {}. {}", authors_apa(&citation.authors), year, title, source, url)
        }
        CitationStyle::Mla => {
            format!("{}\"{}.\" {}, {}. {}.", terminate(&authors_mla(&citation.authors)), title, source, year, url)
        }
        CitationStyle::Chicago => format!(
            "{}\"{}.\" {}. Accessed {}. {}.",
            terminate(&authors_chicago(&citation.authors)),
            title,
            source,
            today.format("%B %-d, %Y"),
            url
        ),
        CitationStyle::Ieee => format!(
            "[{}] {}, \"{},\" {}, {}. [Online]. Available: {}",
            number,
            join_with_and(&citation.authors, ", and "),
            title,
            source,
            year,
            url
        ),
        CitationStyle::Harvard => format!(
            "{} ({}) {}. {}. Available at: {} (Accessed: {}).",
            authors_harvard(&citation.authors),
            year,
            title,
            source,
            url,
            today.format("%-d %B %Y")
        ),
    }
}

/// Format a numbered bibliography, one blank line between entries
pub fn format_bibliography(citations: &[SelectedCitation], style: CitationStyle) -> String {
    format_bibliography_on(citations, style, Local::now().date_naive())
}

/// [`format_bibliography`] with an explicit date for access stamps
pub fn format_bibliography_on(
    citations: &[SelectedCitation],
    style: CitationStyle,
    today: NaiveDate,
) -> String {
    citations
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let entry = format_citation(c, i + 1, style, today);
            match style {
                CitationStyle::Ieee => entry,
                _ => format!("[{}] {}", i + 1, entry),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Close an author list with ". ", unless it already ends in a period
fn terminate(authors: &str) -> String {
    match authors {
        "" => String::new(),
        _ if authors.ends_with('.') => format!("{} ", authors),
        _ => format!("{}. ", authors),
    }
}

fn authors_apa(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} & {}", a, b),
        _ if authors.len() <= 7 => join_with_and(authors, ", & "),
        _ => format!("{}, ... {}", authors[..6].join(", "), authors[authors.len() - 1]),
    }
}

fn authors_mla(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [first, ..] => format!("{}, et al.", first),
    }
}

fn authors_chicago(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [a, b, c] => format!("{}, {}, and {}", a, b, c),
        [first, ..] => format!("{} et al.", first),
    }
}

fn authors_harvard(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [a, b, c] => format!("{}, {} and {}", a, b, c),
        [first, ..] => format!("{} et al.", first),
    }
}

/// "A, B<last_sep>C"; two authors are joined with a plain " and "
fn join_with_and(authors: &[String], last_sep: &str) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [init @ .., last] => format!("{}{}{}", init.join(", "), last_sep, last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(authors: &[&str], year: Option<i32>) -> SelectedCitation {
        SelectedCitation {
            title: "Deep Residual Learning".to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            url: "https://doi.org/10.1109/cvpr.2016.90".to_string(),
            excerpt: String::new(),
            citation_count: 100,
            source: "Semantic Scholar".to_string(),
            doi: Some("10.1109/cvpr.2016.90".to_string()),
            year,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_apa() {
        let c = citation(&["K. He", "X. Zhang", "S. Ren"], Some(2016));
        assert_eq!(
            format_citation(&c, 1, CitationStyle::Apa, today()),
            "K. He, X. Zhang, & S. Ren (2016). Deep Residual Learning. Semantic Scholar. https://doi.org/10.1109/cvpr.2016.90"
        );
    }

    #[test]
    fn test_apa_many_authors() {
        let names: Vec<String> = (1..=9).map(|i| format!("A{}", i)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let c = citation(&names, Some(2020));
        assert!(format_citation(&c, 1, CitationStyle::Apa, today())
            .starts_with("A1, A2, A3, A4, A5, A6, ... A9 (2020)"));
    }

    #[test]
    fn test_mla_and_missing_year() {
        let c = citation(&["K. He", "X. Zhang", "S. Ren"], None);
        assert_eq!(
            format_citation(&c, 1, CitationStyle::Mla, today()),
            "K. He, et al. \"Deep Residual Learning.\" Semantic Scholar, 2024. https://doi.org/10.1109/cvpr.2016.90."
        );
    }

    #[test]
    fn test_chicago_access_date() {
        let c = citation(&["K. He"], Some(2016));
        assert_eq!(
            format_citation(&c, 1, CitationStyle::Chicago, today()),
            "K. He. \"Deep Residual Learning.\" Semantic Scholar. Accessed March 5, 2024. https://doi.org/10.1109/cvpr.2016.90."
        );
    }

    #[test]
    fn test_chicago_et_al_single_period() {
        let c = citation(&["K. He", "X. Zhang", "S. Ren", "J. Sun"], Some(2016));
        assert_eq!(
            format_citation(&c, 1, CitationStyle::Chicago, today()),
            "K. He et al. \"Deep Residual Learning.\" Semantic Scholar. Accessed March 5, 2024. https://doi.org/10.1109/cvpr.2016.90."
        );
    }

    #[test]
    fn test_no_authors_starts_with_title() {
        let c = citation(&[], Some(2016));
        assert!(format_citation(&c, 1, CitationStyle::Mla, today()).starts_with("\"Deep Residual Learning.\""));
    }

    #[test]
    fn test_ieee_numbered() {
        let c = citation(&["K. He", "X. Zhang", "S. Ren"], Some(2016));
        assert_eq!(
            format_citation(&c, 3, CitationStyle::Ieee, today()),
            "[3] K. He, X. Zhang, and S. Ren, \"Deep Residual Learning,\" Semantic Scholar, 2016. [Online]. Available: https://doi.org/10.1109/cvpr.2016.90"
        );
    }

    #[test]
    fn test_harvard() {
        let c = citation(&["K. He", "X. Zhang"], Some(2016));
        assert_eq!(
            format_citation(&c, 1, CitationStyle::Harvard, today()),
            "K. He and X. Zhang (2016) Deep Residual Learning. Semantic Scholar. Available at: https://doi.org/10.1109/cvpr.2016.90 (Accessed: 5 March 2024)."
        );
    }

    #[test]
    fn test_bibliography_numbering() {
        let list = vec![citation(&["A"], Some(2001)), citation(&["B"], Some(2002))];

        let apa = format_bibliography_on(&list, CitationStyle::Apa, today());
        assert!(apa.starts_with("[1] A (2001)"));
        assert!(apa.contains("\n\n[2] B (2002)"));

        let ieee = format_bibliography_on(&list, CitationStyle::Ieee, today());
        assert!(ieee.starts_with("[1] A, "));
        assert!(!ieee.contains("[1] [1]"));

        assert_eq!(format_bibliography_on(&[], CitationStyle::Mla, today()), "");
    }
}
