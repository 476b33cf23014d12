use crate::commit::{batch_commit_message, entry_commit_message, release_commit_message};
use crate::config::ChangelogConfig;
use crate::dedup::filter_new_entries_in_file;
use crate::error::{ChangelogError, ResultExt};
use crate::formatter::{MarkdownEntryFormatter, render};
use crate::links::inline_reference_links;
use crate::merge::{DefaultMerger, EntryMerger};
use crate::parser::Parser;
use crate::release::{DatedReleaseCutter, ReleaseCutter, find_version_body};
use crate::status::HandlerStatus;
use crate::types::{ChangelogDocument, ClassifiedEntry, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Written when a repository has no changelog yet. The `0.0.0` section is a
/// placeholder and disappears on the first update.
pub const CHANGELOG_TEMPLATE: &str = "# Changelog

All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](http://keepachangelog.com/)
and this project adheres to [Semantic Versioning](http://semver.org/).

## [0.0.0]
";

/// Result of merging a batch of entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Entries actually written, duplicates excluded
    pub added: Vec<ClassifiedEntry>,
    pub commit_message: Option<String>,
}

impl UpdateOutcome {
    fn unchanged() -> Self {
        Self {
            added: Vec::new(),
            commit_message: None,
        }
    }

    #[must_use]
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Result of cutting a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The changelog file does not exist
    Missing,
    /// The release section already exists or there is nothing to close
    Unchanged,
    Released {
        version: String,
        /// Rendered content of the new section, empty sections excluded
        notes: Option<String>,
        commit_message: String,
    },
}

/// A changelog file and the configuration governing updates to it.
///
/// Every operation re-reads the file, so no state is cached between calls.
#[derive(Debug, Clone)]
pub struct Changelog {
    path: PathBuf,
    config: ChangelogConfig,
    parser: Parser,
}

impl Changelog {
    pub fn new(path: impl Into<PathBuf>, config: ChangelogConfig) -> Self {
        Self {
            path: path.into(),
            config,
            parser: Parser::new(),
        }
    }

    /// The changelog configured for the repository rooted at `root`
    pub fn for_repository(root: &Path, config: ChangelogConfig) -> Self {
        Self::new(config.changelog_path(root), config)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn config(&self) -> &ChangelogConfig {
        &self.config
    }

    /// File name used in status messages
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.config.file
    }

    /// Writes [`CHANGELOG_TEMPLATE`] when the file is missing. Returns
    /// whether the file was created.
    ///
    /// # Errors
    /// Returns an error if the template cannot be written
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ChangelogError::WriteError(parent.to_path_buf(), e))?;
        }
        self.write(CHANGELOG_TEMPLATE)?;
        tracing::info!(path = %self.path.display(), "created changelog from template");
        Ok(true)
    }

    /// Rewrites reference-style links in the file as inline links. Returns
    /// whether the file changed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or written
    pub fn normalize_links(&self) -> Result<bool> {
        let content = self.read_raw()?;
        let normalized = inline_reference_links(&content);
        if normalized == content {
            return Ok(false);
        }
        self.write(&normalized)?;
        tracing::info!(path = %self.path.display(), "inlined reference links");
        Ok(true)
    }

    /// Creates, normalizes and parses the changelog
    ///
    /// # Errors
    /// Returns an error if the file cannot be written or parsed
    pub fn read(&self) -> Result<ChangelogDocument> {
        self.ensure_exists()?;
        self.normalize_links()?;
        self.parse_file()
    }

    /// Parses the file as it is on disk, without creating or normalizing it
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn parse_file(&self) -> Result<ChangelogDocument> {
        let content = self.read_raw()?;
        self.parser
            .parse(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    /// Merges the entries not yet present into the open section and writes
    /// the file.
    ///
    /// # Errors
    /// Returns an error if the changelog cannot be read, parsed or written
    pub fn add_entries(&self, batch: Vec<ClassifiedEntry>, repository_url: &str) -> Result<UpdateOutcome> {
        let candidates = batch.len();
        let fresh = filter_new_entries_in_file(batch, &self.path);
        if fresh.is_empty() {
            tracing::debug!(candidates, "every entry is already in the changelog");
            return Ok(UpdateOutcome::unchanged());
        }

        let mut document = self.read()?;
        let formatter = MarkdownEntryFormatter::new(self.config.add_author);
        let merger = DefaultMerger::new(&formatter, repository_url);
        let lines = merger.merge_all(&mut document, &fresh);

        self.write(&render(&document))?;
        tracing::info!(
            path = %self.path.display(),
            entries = fresh.len(),
            lines,
            "updated changelog"
        );

        let commit_message = match fresh.as_slice() {
            [single] => entry_commit_message(single),
            many => batch_commit_message(many),
        };
        Ok(UpdateOutcome {
            added: fresh,
            commit_message: Some(commit_message),
        })
    }

    /// Cuts `version` from the open section, dated `date` or today.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, written or re-parsed
    pub fn close(&self, version: &str, date: Option<NaiveDate>) -> Result<ReleaseOutcome> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no changelog to close");
            return Ok(ReleaseOutcome::Missing);
        }

        let content = self.read_raw()?;
        let cutter = date.map_or_else(DatedReleaseCutter::today, DatedReleaseCutter::new);
        let updated = cutter
            .add_release(&content, version)
            .with_context(|| format!("Failed to add release {version}"))?;
        if updated == content {
            return Ok(ReleaseOutcome::Unchanged);
        }

        self.write(&updated)?;
        tracing::info!(path = %self.path.display(), version, "closed changelog for release");

        let document = self
            .parser
            .parse(&inline_reference_links(&updated))
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        let notes = find_version_body(version, Some(&document)).filter(|body| !body.is_empty());

        Ok(ReleaseOutcome::Released {
            version: version.to_string(),
            notes,
            commit_message: release_commit_message(version, &self.config.skill),
        })
    }

    /// Status for an entry update in the repository `slug`
    #[must_use]
    pub fn update_status(&self, outcome: &UpdateOutcome, slug: &str) -> HandlerStatus {
        if outcome.changed() {
            HandlerStatus::success(format!("Updated {} in {slug}", self.file_name()))
        } else {
            HandlerStatus::success(format!("No updates to {} in {slug}", self.file_name())).hidden()
        }
    }

    /// Status for a release cut in the repository `slug`
    #[must_use]
    pub fn release_status(&self, outcome: &ReleaseOutcome, version: &str, slug: &str) -> HandlerStatus {
        match outcome {
            ReleaseOutcome::Missing => {
                HandlerStatus::success(format!("No {} found in {slug}", self.file_name())).hidden()
            }
            ReleaseOutcome::Unchanged => {
                HandlerStatus::success(format!("No changes to {} found in {slug}", self.file_name()))
            }
            ReleaseOutcome::Released { .. } => HandlerStatus::success(format!(
                "Updated changelog in {slug} for release {version}"
            )),
        }
    }

    fn read_raw(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))
    }

    fn write(&self, content: &str) -> Result<()> {
        fs::write(&self.path, content).map_err(|e| ChangelogError::WriteError(self.path.clone(), e))
    }
}
