//! Idempotence filter for candidate entries.
//!
//! An entry is already present when its URL occurs anywhere in the current
//! changelog text. Reprocessing the same issue, pull request or commit must
//! never add a second line.

use crate::error::ChangelogError;
use crate::types::{ClassifiedEntry, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Matches `url` as a whole token, so `.../issues/1` does not match inside
/// `.../issues/11`
pub fn build_url_pattern(url: &str) -> Result<Regex> {
    let escaped = regex::escape(url);
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let start = if url.starts_with(is_word) { r"\b" } else { "" };
    let end = if url.ends_with(is_word) { r"\b" } else { "" };
    Regex::new(&format!("{start}{escaped}{end}"))
        .map_err(|e| ChangelogError::ParseError(e.to_string()))
}

#[must_use]
pub fn url_is_present(content: &str, url: &str) -> bool {
    match build_url_pattern(url) {
        Ok(pattern) => pattern.is_match(content),
        Err(_) => content.contains(url),
    }
}

/// Keeps entries whose URL is absent from `content` and not repeated
/// earlier in the batch. Without content every candidate is new.
#[must_use]
pub fn filter_new_entries(batch: Vec<ClassifiedEntry>, content: Option<&str>) -> Vec<ClassifiedEntry> {
    let mut seen: HashSet<String> = HashSet::with_capacity(batch.len());

    batch
        .into_iter()
        .filter(|candidate| {
            let url = candidate.entry.url.as_str();
            if !seen.insert(url.to_string()) {
                tracing::debug!(url, "skipping entry repeated within batch");
                return false;
            }
            if content.is_some_and(|content| url_is_present(content, url)) {
                tracing::debug!(url, "skipping entry already in changelog");
                return false;
            }
            true
        })
        .collect()
}

/// Like [`filter_new_entries`], reading the changelog from disk. A missing
/// or unreadable file lets every candidate through.
#[must_use]
pub fn filter_new_entries_in_file(batch: Vec<ClassifiedEntry>, path: &Path) -> Vec<ClassifiedEntry> {
    match fs::read_to_string(path) {
        Ok(content) => filter_new_entries(batch, Some(&content)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "changelog not readable, keeping all entries");
            filter_new_entries(batch, None)
        }
    }
}

/// Drops entries describing commits that only touched the changelog, i.e.
/// commits this tool produced itself. Matching is by SHA prefix against the
/// entry label, so it is best-effort.
#[must_use]
pub fn exclude_generated_commits(
    batch: Vec<ClassifiedEntry>,
    generated_shas: &[String],
) -> Vec<ClassifiedEntry> {
    batch
        .into_iter()
        .filter(|candidate| {
            let label = candidate.entry.label.trim();
            let generated = !label.is_empty()
                && generated_shas.iter().any(|sha| sha.starts_with(label));
            if generated {
                tracing::debug!(label, "skipping generated changelog commit");
            }
            !generated
        })
        .collect()
}
