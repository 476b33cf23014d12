use crate::formatter::EntryFormatter;
use crate::types::{ChangelogDocument, ChangelogEntry, ClassifiedEntry, VersionSection, VersionTag};

/// Inserts entries into the open section of a parsed document.
///
/// Merging never deduplicates and never touches storage; callers filter
/// candidates first (see [`crate::dedup`]).
pub trait EntryMerger {
    /// Appends `entry` to its category in the open section and returns the
    /// rendered line.
    fn merge(&self, document: &mut ChangelogDocument, entry: &ChangelogEntry) -> String;

    /// Files every classified entry under each of its categories
    fn merge_all(&self, document: &mut ChangelogDocument, batch: &[ClassifiedEntry]) -> usize {
        let mut added = 0;
        for classified in batch {
            for category in classified.resolved_categories() {
                let entry = classified.entry.clone().with_category(category);
                self.merge(document, &entry);
                added += 1;
            }
        }
        added
    }
}

pub enum OpenSectionStrategy {
    /// The first section is still open
    Reuse,
    /// A new open section must be prepended with this heading
    Create(String),
}

pub struct DefaultMerger<'a> {
    formatter: &'a dyn EntryFormatter,
    repository_url: &'a str,
}

impl<'a> DefaultMerger<'a> {
    /// `repository_url` is the web URL of the repository, used to link a
    /// newly created `Unreleased` heading.
    pub fn new(formatter: &'a dyn EntryFormatter, repository_url: &'a str) -> Self {
        Self {
            formatter,
            repository_url,
        }
    }

    pub fn strategy(&self, document: &ChangelogDocument) -> OpenSectionStrategy {
        if document.open_section().is_some() {
            OpenSectionStrategy::Reuse
        } else {
            OpenSectionStrategy::Create(unreleased_title(
                self.repository_url,
                document.latest_release(),
            ))
        }
    }

    /// The open section, prepended first when the document has none
    pub fn open_section<'d>(&self, document: &'d mut ChangelogDocument) -> &'d mut VersionSection {
        if let OpenSectionStrategy::Create(title) = self.strategy(document) {
            tracing::debug!(%title, "creating unreleased section");
            document
                .versions
                .insert(0, VersionSection::new(VersionTag::Unreleased, title));
        }
        &mut document.versions[0]
    }
}

impl EntryMerger for DefaultMerger<'_> {
    fn merge(&self, document: &mut ChangelogDocument, entry: &ChangelogEntry) -> String {
        let category = entry.category_or_default();
        let line = self.formatter.format(entry);

        let section = self.open_section(document);
        section.parsed.append_entry(category.heading(), line.clone());

        tracing::debug!(
            label = %entry.label,
            category = category.label(),
            "merged changelog entry"
        );
        line
    }
}

/// Heading for a new open section: compare against the latest release, or
/// the tree of `HEAD` when nothing was released yet.
#[must_use]
pub fn unreleased_title(repository_url: &str, latest_release: Option<&str>) -> String {
    let base = repository_url.trim_end_matches('/');
    match latest_release {
        Some(version) => format!("[Unreleased]({base}/compare/{version}...HEAD)"),
        None => format!("[Unreleased]({base}/tree/HEAD)"),
    }
}
