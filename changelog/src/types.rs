use crate::error::ChangelogError;
use crate::utils::CHANGELOG_ITEM_PATTERN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type alias for Result with `ChangelogError`
pub type Result<T> = std::result::Result<T, ChangelogError>;

/// Key of the catch-all bucket holding entry lines that sit outside any
/// category heading. Never rendered.
pub const UNCATEGORIZED: &str = "_";

/// Version token marking the template placeholder section. Never rendered.
pub const PLACEHOLDER_VERSION: &str = "0.0.0";

/// Keep-a-Changelog categories, declared in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Added,
        Category::Changed,
        Category::Deprecated,
        Category::Removed,
        Category::Fixed,
        Category::Security,
    ];

    /// Capitalized name used for `### <Category>` headings
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Changed => "Changed",
            Self::Deprecated => "Deprecated",
            Self::Removed => "Removed",
            Self::Fixed => "Fixed",
            Self::Security => "Security",
        }
    }

    /// Lowercase name used in labels, commit markers and commit messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Deprecated => "deprecated",
            Self::Removed => "removed",
            Self::Fixed => "fixed",
            Self::Security => "security",
        }
    }

    /// Case-insensitive lookup of a category name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(name))
    }

    /// Position of an arbitrary category heading in render order. Names
    /// outside the taxonomy sort after every known category.
    #[must_use]
    pub fn rank(name: &str) -> usize {
        Self::from_name(name).map_or(Self::ALL.len(), |category| category as usize)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| {
            ChangelogError::ParseError(format!(
                "unknown category '{s}', expected one of: added, changed, deprecated, removed, fixed, security"
            ))
        })
    }
}

/// Tag rendered as a bold uppercase prefix on an entry line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    Breaking,
}

impl Qualifier {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Breaking => "breaking",
        }
    }

    /// `**BREAKING**`
    #[must_use]
    pub fn marker(self) -> String {
        format!("**{}**", self.name().to_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            name: None,
            email: None,
        }
    }
}

/// A candidate changelog line derived from an issue, pull request or commit.
///
/// `url` is the deduplication key: an entry whose URL already occurs in the
/// changelog text is never added again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    #[serde(default)]
    pub category: Option<Category>,
    pub title: String,
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub authors: Vec<Author>,
}

impl ChangelogEntry {
    pub fn new(title: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            category: None,
            title: title.into(),
            label: label.into(),
            url: url.into(),
            qualifiers: Vec::new(),
            authors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        if !self.qualifiers.contains(&qualifier) {
            self.qualifiers.push(qualifier);
        }
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: Author) -> Self {
        self.authors.push(author);
        self
    }

    /// Entries without a category land in `Changed`
    #[must_use]
    pub fn category_or_default(&self) -> Category {
        self.category.unwrap_or(Category::Changed)
    }
}

/// An entry together with every category it should be filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEntry {
    pub entry: ChangelogEntry,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl ClassifiedEntry {
    pub fn new(entry: ChangelogEntry, categories: Vec<Category>) -> Self {
        Self { entry, categories }
    }

    /// Categories to file under, falling back to the entry's own category
    #[must_use]
    pub fn resolved_categories(&self) -> Vec<Category> {
        if self.categories.is_empty() {
            vec![self.entry.category_or_default()]
        } else {
            self.categories.clone()
        }
    }

    /// `added, fixed` as used in commit messages
    #[must_use]
    pub fn category_labels(&self) -> String {
        self.resolved_categories()
            .iter()
            .map(|category| category.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Identity of a version section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionTag {
    Unreleased,
    Released(String),
}

impl VersionTag {
    /// Interprets the bracketed token of a `##` heading. Every token is a
    /// version except an empty one and `Unreleased`.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.is_empty() || token.eq_ignore_ascii_case("unreleased") {
            return Self::Unreleased;
        }
        Self::Released(token.to_string())
    }

    /// Tag of a heading that carries only a link target. Older changelog
    /// tooling reported the link's host (e.g. `github.com`) as the version
    /// of the open section, so such headings are unreleased.
    #[must_use]
    pub fn from_link_target(host: &str) -> Self {
        tracing::debug!(host, "heading has no version label, treating it as unreleased");
        Self::Unreleased
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Unreleased => None,
            Self::Released(version) => Some(version),
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.version() == Some(PLACEHOLDER_VERSION)
    }

    /// Whether the token is a semantic version, optionally `v`-prefixed
    #[must_use]
    pub fn is_semver(&self) -> bool {
        self.version().is_some_and(|version| {
            semver::Version::parse(version.strip_prefix('v').unwrap_or(version)).is_ok()
        })
    }
}

/// Category name to ordered entry lines, in first-seen order.
///
/// Rendering order follows [`Category::rank`], not insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    groups: Vec<(String, Vec<String>)>,
}

impl CategoryMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, lines)| lines.as_slice())
    }

    /// Lines of `name`, creating an empty group when missing
    pub fn entry(&mut self, name: &str) -> &mut Vec<String> {
        let idx = match self.groups.iter().position(|(group, _)| group == name) {
            Some(idx) => idx,
            None => {
                self.groups.push((name.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx].1
    }

    pub fn push(&mut self, name: &str, line: impl Into<String>) {
        self.entry(name).push(line.into());
    }

    /// Appends an entry line. When the group ends in a paragraph or code
    /// block rather than a list item, a blank line separates the new item.
    pub fn append_entry(&mut self, name: &str, line: impl Into<String>) {
        let lines = self.entry(name);
        let line = line.into();
        let after_paragraph = lines
            .last()
            .is_some_and(|last| !CHANGELOG_ITEM_PATTERN.is_match(last.trim_start_matches('\n')));
        if after_paragraph {
            lines.push(format!("\n{line}"));
        } else {
            lines.push(line);
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in insertion order, `_` included
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.groups
            .iter()
            .map(|(name, lines)| (name.as_str(), lines.as_slice()))
    }

    /// Groups in render order, `_` excluded
    #[must_use]
    pub fn ordered(&self) -> Vec<(&str, &[String])> {
        let mut groups: Vec<_> = self.iter().filter(|(name, _)| *name != UNCATEGORIZED).collect();
        groups.sort_by_key(|(name, _)| Category::rank(name));
        groups
    }
}

/// One `##` section of the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSection {
    pub tag: VersionTag,
    /// Heading markup without the leading `## `
    pub title: String,
    /// Free text between the heading and the first category heading
    pub body: String,
    pub parsed: CategoryMap,
}

impl VersionSection {
    pub fn new(tag: VersionTag, title: impl Into<String>) -> Self {
        Self {
            tag,
            title: title.into(),
            body: String::new(),
            parsed: CategoryMap::new(),
        }
    }

    /// The section that still collects not-yet-released entries
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.tag == VersionTag::Unreleased
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.tag.version()
    }

    /// Rendered body and categories, suitable for release notes
    #[must_use]
    pub fn notes(&self) -> String {
        crate::formatter::render_section_content(self)
    }
}

/// Structured view of a Keep-a-Changelog document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogDocument {
    pub title: String,
    pub description: Option<String>,
    pub versions: Vec<VersionSection>,
}

impl Default for ChangelogDocument {
    fn default() -> Self {
        Self {
            title: "Changelog".to_string(),
            description: None,
            versions: Vec::new(),
        }
    }
}

impl ChangelogDocument {
    /// First section, when it is still open
    #[must_use]
    pub fn open_section(&self) -> Option<&VersionSection> {
        self.versions.first().filter(|section| section.is_open())
    }

    /// Most recent released version, ignoring the template placeholder
    #[must_use]
    pub fn latest_release(&self) -> Option<&str> {
        self.versions
            .iter()
            .filter(|section| !section.tag.is_placeholder())
            .find_map(VersionSection::version)
    }

    #[must_use]
    pub fn find_version(&self, version: &str) -> Option<&VersionSection> {
        self.versions
            .iter()
            .find(|section| section.version() == Some(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_lookup_ignores_case() {
        assert_eq!(Category::from_name("Security"), Some(Category::Security));
        assert_eq!(Category::from_name(" fixed "), Some(Category::Fixed));
        assert_eq!(Category::from_name("misc"), None);
        assert!("bogus".parse::<Category>().is_err());
    }

    #[test]
    fn unknown_categories_rank_last() {
        assert_eq!(Category::rank("Added"), 0);
        assert_eq!(Category::rank("security"), 5);
        assert_eq!(Category::rank("Misc"), 6);
    }

    #[test]
    fn version_tokens() {
        assert_eq!(VersionTag::from_token("Unreleased"), VersionTag::Unreleased);
        assert_eq!(
            VersionTag::from_token("beta.release"),
            VersionTag::Released("beta.release".to_string())
        );
        assert_eq!(
            VersionTag::from_token("release.candidate"),
            VersionTag::Released("release.candidate".to_string())
        );
        assert_eq!(VersionTag::from_link_target("github.com"), VersionTag::Unreleased);
        assert_eq!(
            VersionTag::from_token("1.0.0-M.2"),
            VersionTag::Released("1.0.0-M.2".to_string())
        );
        assert_eq!(
            VersionTag::from_token("version9"),
            VersionTag::Released("version9".to_string())
        );
        assert!(VersionTag::from_token("v0.1.1").is_semver());
        assert!(!VersionTag::from_token("version9").is_semver());
        assert!(VersionTag::from_token("0.0.0").is_placeholder());
    }

    #[test]
    fn category_map_orders_by_taxonomy() {
        let mut map = CategoryMap::new();
        map.push("Security", "-   a");
        map.push(UNCATEGORIZED, "-   stray");
        map.push("Added", "-   b");
        map.push("Fixed", "-   c");
        map.push("Added", "-   d");

        let ordered: Vec<_> = map.ordered().into_iter().map(|(name, _)| name).collect();
        assert_eq!(ordered, vec!["Added", "Fixed", "Security"]);
        assert_eq!(map.get("Added").unwrap(), ["-   b", "-   d"]);
    }

    #[test]
    fn appended_entries_do_not_continue_a_paragraph() {
        let mut map = CategoryMap::new();
        map.append_entry("Added", "-   a");
        map.append_entry("Added", "-   b");
        map.push("Added", "\nSee the migration guide.");
        map.append_entry("Added", "-   c");
        assert_eq!(
            map.get("Added").unwrap(),
            ["-   a", "-   b", "\nSee the migration guide.", "\n-   c"]
        );
    }

    #[test]
    fn latest_release_skips_placeholder() {
        let doc = ChangelogDocument {
            versions: vec![
                VersionSection::new(VersionTag::from_token("0.0.0"), "[0.0.0]"),
                VersionSection::new(VersionTag::from_token("1.2.0"), "[1.2.0]"),
            ],
            ..ChangelogDocument::default()
        };
        assert_eq!(doc.latest_release(), Some("1.2.0"));
        assert!(doc.open_section().is_none());
    }
}
