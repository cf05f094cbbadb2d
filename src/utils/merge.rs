//! Cross-source merging of paper records.
//!
//! Papers are identified by their [`MergeKey`] (DOI, else normalized title).
//! When two sources return the same work, the records are reconciled field by
//! field into a single new record instead of keeping both.

use std::collections::HashMap;

use crate::models::{MergeKey, Paper};

/// Merge the result lists of several sources into one deduplicated list
///
/// Lists are consumed in the given order and papers within a list in their
/// original order. Output keeps first-seen order, which the retrieval service
/// relies on for stable tie-breaking. Papers with neither a DOI nor a usable
/// title are dropped.
pub fn merge_papers<I, L>(result_lists: I) -> Vec<Paper>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = Paper>,
{
    let mut merged: Vec<Paper> = Vec::new();
    let mut index: HashMap<MergeKey, usize> = HashMap::new();

    for paper in result_lists.into_iter().flatten() {
        let Some(key) = paper.merge_key() else {
            tracing::debug!("Dropping unidentifiable paper from {}", paper.source);
            continue;
        };

        match index.get(&key) {
            Some(&pos) => {
                let reconciled = reconcile(&merged[pos], &paper);
                merged[pos] = reconciled;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(paper);
            }
        }
    }

    merged
}

/// Build the record that replaces `existing` once `incoming` is known to be
/// the same work
pub fn reconcile(existing: &Paper, incoming: &Paper) -> Paper {
    let mut merged = existing.clone();

    if !existing.has_pdf() && incoming.has_pdf() {
        merged.pdf_url = incoming.pdf_url.clone();
    }

    merged.citation_count = existing.citation_count.max(incoming.citation_count);

    if !incoming.source.is_empty() && !existing.source.contains(&incoming.source) {
        merged.source = if existing.source.is_empty() {
            incoming.source.clone()
        } else {
            format!("{}, {}", existing.source, incoming.source)
        };
    }

    if existing.doi.as_deref().unwrap_or("").is_empty() && incoming.doi.is_some() {
        merged.doi = incoming.doi.clone();
    }

    if incoming.r#abstract.chars().count() > existing.r#abstract.chars().count() {
        merged.r#abstract = incoming.r#abstract.clone();
    }

    if existing.year.is_none() {
        merged.year = incoming.year;
    }

    merged
}
