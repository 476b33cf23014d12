//! Release cut: turns the `Unreleased` section into a dated version section.
//!
//! This works on the raw text rather than the parsed document because the
//! reference-link style keeps its URLs on separate definition lines that the
//! document model does not carry.

use crate::config::ChangelogConfig;
use crate::error::ChangelogError;
use crate::types::{ChangelogDocument, Result};
use crate::utils::{
    INLINE_COMPARE_UNRELEASED_PATTERN, INLINE_TREE_UNRELEASED_PATTERN,
    REFERENCE_UNRELEASED_PATTERN,
};
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static PLAIN_UNRELEASED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^##[ \t]*\[Unreleased\][ \t]*$")
        .expect("Failed to compile plain unreleased regex")
});

static UNRELEASED_DEFINITION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\[Unreleased\]:").expect("Failed to compile unreleased definition regex")
});

/// How the `Unreleased` heading links to the repository. The styles are
/// mutually exclusive within one document and tried in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnreleasedLink<'c> {
    /// `[Unreleased]: <base>/<previous>...HEAD` on its own definition line
    Reference {
        range: Range<usize>,
        compare_base: &'c str,
        previous: &'c str,
    },
    /// `## [Unreleased](<base>/<previous>...HEAD)`
    InlineCompare {
        range: Range<usize>,
        compare_base: &'c str,
        previous: &'c str,
    },
    /// `## [Unreleased](<base>/tree/HEAD)` for a project never released
    InlineTree { range: Range<usize>, base: &'c str },
    /// `## [Unreleased]` without any link, in a file that has no
    /// `[Unreleased]:` definition line either
    Plain { range: Range<usize> },
}

impl<'c> UnreleasedLink<'c> {
    pub fn detect(content: &'c str) -> Option<Self> {
        if let Some(captures) = REFERENCE_UNRELEASED_PATTERN.captures(content) {
            let whole = captures.get(0)?;
            return Some(Self::Reference {
                range: whole.range(),
                compare_base: captures.get(1)?.as_str(),
                previous: captures.get(2)?.as_str(),
            });
        }
        if let Some(captures) = INLINE_COMPARE_UNRELEASED_PATTERN.captures(content) {
            let whole = captures.get(0)?;
            return Some(Self::InlineCompare {
                range: whole.range(),
                compare_base: captures.get(1)?.as_str(),
                previous: captures.get(2)?.as_str(),
            });
        }
        if let Some(captures) = INLINE_TREE_UNRELEASED_PATTERN.captures(content) {
            let whole = captures.get(0)?;
            return Some(Self::InlineTree {
                range: whole.range(),
                base: captures.get(1)?.as_str(),
            });
        }
        if UNRELEASED_DEFINITION_PATTERN.is_match(content) {
            tracing::debug!("unreleased definition line does not link a comparison, not cutting");
            return None;
        }
        PLAIN_UNRELEASED_PATTERN
            .find(content)
            .map(|whole| Self::Plain { range: whole.range() })
    }

    fn range(&self) -> Range<usize> {
        match self {
            Self::Reference { range, .. }
            | Self::InlineCompare { range, .. }
            | Self::InlineTree { range, .. }
            | Self::Plain { range } => range.clone(),
        }
    }

    /// Text replacing the matched heading or definition
    fn replacement(&self, version: &str, date: &str) -> String {
        match self {
            Self::Reference {
                compare_base,
                previous,
                ..
            } => format!(
                "[Unreleased]: {compare_base}/{version}...HEAD\n\n## [{version}][] - {date}\n\n[{version}]: {compare_base}/{previous}...{version}"
            ),
            Self::InlineCompare {
                compare_base,
                previous,
                ..
            } => format!(
                "## [Unreleased]({compare_base}/{version}...HEAD)\n\n## [{version}]({compare_base}/{previous}...{version}) - {date}"
            ),
            Self::InlineTree { base, .. } => format!(
                "## [Unreleased]({base}/compare/{version}...HEAD)\n\n## [{version}]({base}/tree/{version}) - {date}"
            ),
            Self::Plain { .. } => format!("## [Unreleased]\n\n## [{version}] - {date}"),
        }
    }

    #[must_use]
    pub fn style_name(&self) -> &'static str {
        match self {
            Self::Reference { .. } => "reference",
            Self::InlineCompare { .. } => "inline-compare",
            Self::InlineTree { .. } => "inline-tree",
            Self::Plain { .. } => "plain",
        }
    }
}

pub trait ReleaseCutter {
    /// Returns `content` with a section for `version`, or `content`
    /// unchanged when that section already exists or no `Unreleased`
    /// heading is found.
    fn add_release(&self, content: &str, version: &str) -> Result<String>;
}

/// Cuts releases dated with a fixed day
#[derive(Debug, Clone, Copy)]
pub struct DatedReleaseCutter {
    date: NaiveDate,
}

impl DatedReleaseCutter {
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Dated with the local calendar day of the call
    #[must_use]
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl ReleaseCutter for DatedReleaseCutter {
    fn add_release(&self, content: &str, version: &str) -> Result<String> {
        validate_version(version)?;

        if release_exists(content, version) {
            tracing::debug!(version, "release section already present");
            return Ok(content.to_string());
        }

        let Some(link) = UnreleasedLink::detect(content) else {
            tracing::warn!(version, "no Unreleased heading found, changelog left untouched");
            return Ok(content.to_string());
        };

        let date = format_date(self.date);
        let range = link.range();
        tracing::debug!(version, style = link.style_name(), "cutting release");

        let replacement = link.replacement(version, &date);
        let mut updated = String::with_capacity(content.len() + replacement.len());
        updated.push_str(&content[..range.start]);
        updated.push_str(&replacement);
        updated.push_str(&content[range.end..]);
        Ok(updated)
    }
}

fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() || version.chars().any(|c| c.is_whitespace() || c == '[' || c == ']') {
        return Err(ChangelogError::InvalidVersion(format!(
            "'{version}' cannot be used as a release heading"
        )));
    }
    Ok(())
}

/// Whether a `## [<version>]` heading exists
#[must_use]
pub fn release_exists(content: &str, version: &str) -> bool {
    Regex::new(&format!(r"(?m)^## \[{}\]", regex::escape(version)))
        .is_ok_and(|pattern| pattern.is_match(content))
}

/// Adds a release dated today
pub fn changelog_add_release(content: &str, version: &str) -> Result<String> {
    DatedReleaseCutter::today().add_release(content, version)
}

/// Adds a release with an explicit date
pub fn changelog_add_release_on(content: &str, version: &str, date: NaiveDate) -> Result<String> {
    DatedReleaseCutter::new(date).add_release(content, version)
}

/// `YYYY-MM-DD`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Everything under the heading that starts with `[<tag>]`, trimmed
#[must_use]
pub fn find_version_body(tag: &str, changelog: Option<&ChangelogDocument>) -> Option<String> {
    let pattern = Regex::new(&format!(r"^\[{}\]", regex::escape(tag))).ok()?;
    changelog?
        .versions
        .iter()
        .find(|section| pattern.is_match(&section.title))
        .map(|section| section.notes().trim().to_string())
}

/// Release body with the changelog section appended, or `None` when the
/// release already contains it.
#[must_use]
pub fn merge_release_body(existing: Option<&str>, section: &str) -> Option<String> {
    let section = section.trim();
    let existing = existing.unwrap_or_default();
    if section.is_empty() || existing.contains(section) {
        return None;
    }
    let existing = existing.trim();
    if existing.is_empty() {
        Some(section.to_string())
    } else {
        Some(format!("{existing}\n\n{section}"))
    }
}

/// Configured announcement channels, or the repository's linked channels
/// when none are configured
#[must_use]
pub fn announcement_channels(config: &ChangelogConfig, linked: &[String]) -> Vec<String> {
    if config.announce_channel.is_empty() {
        linked.to_vec()
    } else {
        config
            .announce_channel
            .iter()
            .map(|channel| channel.channel_name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnnounceChannel;
    use crate::types::{VersionSection, VersionTag};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 5, 4).unwrap()
    }

    #[test]
    fn formats_dates() {
        let d = NaiveDate::from_ymd_opt(1969, 8, 6).unwrap();
        assert_eq!(format_date(d), "1969-08-06");
    }

    #[test]
    fn cuts_reference_style() {
        let content = "# Change Log\n\n## [Unreleased][]\n\n[Unreleased]: https://x/compare/0.1.1...HEAD\n\n### Added\n\n-   New\n\n## [0.1.1][] - 2018-05-10\n";
        let cut = changelog_add_release_on(content, "0.2.0", date()).unwrap();
        assert_eq!(
            cut,
            "# Change Log\n\n## [Unreleased][]\n\n[Unreleased]: https://x/compare/0.2.0...HEAD\n\n## [0.2.0][] - 2021-05-04\n\n[0.2.0]: https://x/compare/0.1.1...0.2.0\n\n### Added\n\n-   New\n\n## [0.1.1][] - 2018-05-10\n"
        );
    }

    #[test]
    fn cuts_inline_compare_style_with_milestones() {
        let content = "# Changelog\n\n## [Unreleased](https://x/compare/1.0.0-M.1...HEAD)\n\n### Added\n\n-   New\n";
        let cut = changelog_add_release_on(content, "1.0.0-M.2", date()).unwrap();
        assert_eq!(
            cut,
            "# Changelog\n\n## [Unreleased](https://x/compare/1.0.0-M.2...HEAD)\n\n## [1.0.0-M.2](https://x/compare/1.0.0-M.1...1.0.0-M.2) - 2021-05-04\n\n### Added\n\n-   New\n"
        );
    }

    #[test]
    fn cuts_tree_style_for_first_release() {
        let content = "# Changelog\n\n## [Unreleased](https://x/tree/HEAD)\n\n### Fixed\n\n-   Bug\n";
        let cut = changelog_add_release_on(content, "0.1.0", date()).unwrap();
        assert_eq!(
            cut,
            "# Changelog\n\n## [Unreleased](https://x/compare/0.1.0...HEAD)\n\n## [0.1.0](https://x/tree/0.1.0) - 2021-05-04\n\n### Fixed\n\n-   Bug\n"
        );
    }

    #[test]
    fn cuts_plain_heading() {
        let content = "# Changelog\n\n## [Unreleased]\n\n### Fixed\n\n-   Bug\n";
        let cut = changelog_add_release_on(content, "0.1.0", date()).unwrap();
        assert_eq!(
            cut,
            "# Changelog\n\n## [Unreleased]\n\n## [0.1.0] - 2021-05-04\n\n### Fixed\n\n-   Bug\n"
        );
    }

    #[test]
    fn plain_heading_with_unusable_definition_is_left_alone() {
        let content = "# Changelog\n\n## [Unreleased]\n\n[Unreleased]: https://x/tree/main\n\n### Fixed\n\n-   Bug\n";
        assert_eq!(UnreleasedLink::detect(content), None);
        assert_eq!(changelog_add_release_on(content, "0.1.0", date()).unwrap(), content);
    }

    #[test]
    fn second_cut_is_a_no_op() {
        let content = "# Changelog\n\n## [Unreleased](https://x/compare/v0.1.1...HEAD)\n\n### Added\n\n-   New\n";
        let once = changelog_add_release_on(content, "v0.2.0", date()).unwrap();
        let twice = changelog_add_release_on(&once, "v0.2.0", date()).unwrap();
        assert_ne!(once, content);
        assert_eq!(once, twice);
    }

    #[test]
    fn without_unreleased_heading_content_is_unchanged() {
        let content = "# Changelog\n\n## [0.1.0] - 2020-01-01\n";
        assert_eq!(changelog_add_release_on(content, "0.2.0", date()).unwrap(), content);
    }

    #[test]
    fn rejects_unusable_versions() {
        assert!(changelog_add_release_on("", "", date()).is_err());
        assert!(changelog_add_release_on("", "1.0 beta", date()).is_err());
    }

    #[test]
    fn finds_body_by_exact_tag() {
        let section = |title: &str, body: &str| {
            let mut s = VersionSection::new(VersionTag::Released(String::new()), title);
            s.body = body.to_string();
            s
        };
        let doc = ChangelogDocument {
            versions: vec![
                section("[v10](https://g.com/a/k/compare/version9...v10) - 2018-03-03", "nope"),
                section("[version9](https://g.com/a/k/compare/v0.5.1...version9) - 2018-03-02", " oui \n"),
                section("[v0.5.1](https://g.com/a/k/compare/v0.5.0...v0.5.1) - 2018-03-01", "nil"),
            ],
            ..ChangelogDocument::default()
        };
        assert_eq!(find_version_body("version9", Some(&doc)).as_deref(), Some("oui"));
        assert_eq!(find_version_body("v0.5.1", Some(&doc)).as_deref(), Some("nil"));
        assert_eq!(find_version_body("1.0.0", Some(&doc)), None);
        assert_eq!(find_version_body("v10", None), None);
    }

    #[test]
    fn release_body_is_appended_once() {
        assert_eq!(
            merge_release_body(Some("Existing notes\n"), "### Added\n\n-   New\n").as_deref(),
            Some("Existing notes\n\n### Added\n\n-   New")
        );
        assert_eq!(merge_release_body(None, " body ").as_deref(), Some("body"));
        assert_eq!(merge_release_body(Some("prefix body suffix"), "body"), None);
        assert_eq!(merge_release_body(Some("x"), "  "), None);
    }

    #[test]
    fn configured_channels_win_over_linked_ones() {
        let linked = vec!["linked".to_string()];
        let mut config = ChangelogConfig::default();
        assert_eq!(announcement_channels(&config, &linked), linked);

        config.announce_channel = vec![AnnounceChannel {
            channel_name: "releases".to_string(),
        }];
        assert_eq!(announcement_channels(&config, &linked), vec!["releases".to_string()]);
    }
}
