//! Keep-a-Changelog document model and update engine.
//!
//! The pipeline for every operation is stateless:
//! read → normalize links → parse → merge entries or cut a release →
//! serialize → write. [`Changelog`] drives it against a file on disk; the
//! free functions below expose the in-memory steps.

pub mod classify;
pub mod commit;
pub mod config;
pub mod core;
pub mod dedup;
pub mod error;
pub mod formatter;
pub mod links;
pub mod merge;
pub mod parser;
pub mod release;
pub mod status;
pub mod types;
pub mod utils;

use crate::merge::EntryMerger;

pub use crate::classify::{
    Classification, CommitInfo, IssueInfo, PullRequestInfo, PushInfo, RepoRef,
};
pub use crate::config::{ChangelogConfig, CommitRules};
pub use crate::core::{CHANGELOG_TEMPLATE, Changelog, ReleaseOutcome, UpdateOutcome};
pub use crate::error::{ChangelogError, ResultExt};
pub use crate::formatter::{EntryFormatter, MarkdownEntryFormatter, render};
pub use crate::parser::Parser;
pub use crate::release::{changelog_add_release, changelog_add_release_on, format_date};
pub use crate::status::{HandlerStatus, Visibility};
pub use crate::types::{
    Author, Category, ChangelogDocument, ChangelogEntry, ClassifiedEntry, Qualifier, Result,
    VersionSection, VersionTag,
};

/// Parses changelog text after inlining reference links
///
/// # Errors
/// Returns an error if the text is not a well-formed changelog
pub fn parse_changelog(content: &str) -> Result<ChangelogDocument> {
    Parser::new().parse(&links::inline_reference_links(content))
}

/// Adds one entry to changelog text, returning the new text. The entry is
/// not added again when its URL already occurs in `content`.
///
/// # Errors
/// Returns an error if `content` cannot be parsed
pub fn add_entry_to_text(
    content: &str,
    entry: &ChangelogEntry,
    repository_url: &str,
    include_authors: bool,
) -> Result<String> {
    if dedup::url_is_present(content, &entry.url) {
        return Ok(content.to_string());
    }
    let mut document = parse_changelog(content)?;
    let formatter = MarkdownEntryFormatter::new(include_authors);
    merge::DefaultMerger::new(&formatter, repository_url).merge(&mut document, entry);
    Ok(render(&document))
}
