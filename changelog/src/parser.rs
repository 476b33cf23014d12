use crate::error::ChangelogError;
use crate::types::{
    ChangelogDocument, Result, UNCATEGORIZED, VersionSection, VersionTag,
};
use crate::utils::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    /// Before the first version heading
    Preamble,
    /// Between a version heading and its first category heading
    Body,
    Category,
}

#[derive(Debug)]
struct ParserState {
    region: Region,
    fence_opened_at: Option<usize>,
    /// The current line sits between an opening and a closing fence
    inside_fence: bool,
    /// Blank lines seen since the last category line
    pending_blanks: usize,
    title: Option<String>,
    description: Vec<String>,
    body: Vec<String>,
    current_version: Option<VersionSection>,
    current_category: Option<String>,
    versions: Vec<VersionSection>,
}

impl ParserState {
    fn new() -> Self {
        Self {
            region: Region::Preamble,
            fence_opened_at: None,
            inside_fence: false,
            pending_blanks: 0,
            title: None,
            description: Vec::new(),
            body: Vec::new(),
            current_version: None,
            current_category: None,
            versions: Vec::new(),
        }
    }

    fn finish_section(&mut self) {
        if let Some(mut section) = self.current_version.take() {
            section.body = join_trimmed(&self.body);
            self.versions.push(section);
        }
        self.body.clear();
        self.current_category = None;
        self.pending_blanks = 0;
    }
}

/// Parses Keep-a-Changelog Markdown into a [`ChangelogDocument`].
///
/// Only `#`, `##` and `###` headings are structural. Entry lines are kept
/// verbatim; lines continuing a list item are folded into that item, blank
/// lines included. A paragraph separated from the items by a blank line
/// becomes its own element of the category, carrying the blank lines that
/// preceded it, so rendering reproduces the original text.
#[derive(Debug, Clone)]
pub struct Parser {
    default_title: String,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_title: "Changelog".to_string(),
        }
    }

    /// Parses a document
    ///
    /// # Errors
    /// Returns [`ChangelogError::InvalidFormat`] when a code fence is never
    /// closed, since everything after it would be swallowed.
    pub fn parse(&self, content: &str) -> Result<ChangelogDocument> {
        let mut state = ParserState::new();

        for (line_num, line) in content.lines().enumerate() {
            self.parse_line(line, line_num, &mut state);
        }

        if let Some(line_num) = state.fence_opened_at {
            return Err(ChangelogError::InvalidFormat(
                line_num + 1,
                "code fence is never closed".to_string(),
            ));
        }

        state.finish_section();

        let description = join_trimmed(&state.description);
        let document = ChangelogDocument {
            title: state.title.unwrap_or_else(|| self.default_title.clone()),
            description: (!description.is_empty()).then_some(description),
            versions: state.versions,
        };

        tracing::debug!(
            title = %document.title,
            versions = document.versions.len(),
            "parsed changelog"
        );

        Ok(document)
    }

    fn parse_line(&self, line: &str, line_num: usize, state: &mut ParserState) {
        state.inside_fence = state.fence_opened_at.is_some();
        if CODE_FENCE_PATTERN.is_match(line) {
            state.fence_opened_at = match state.fence_opened_at {
                Some(_) => None,
                None => Some(line_num),
            };
            self.handle_content_line(line, state);
            return;
        }
        if state.fence_opened_at.is_some() {
            self.handle_content_line(line, state);
            return;
        }

        if let Some(captures) = VERSION_HEADER_PATTERN.captures(line) {
            self.handle_version_header(&captures[1], state);
        } else if let Some(captures) = CHANGELOG_CATEGORY_PATTERN
            .captures(line)
            .filter(|_| state.current_version.is_some())
        {
            self.handle_category_header(&captures[1], state);
        } else if let Some(captures) = TITLE_PATTERN
            .captures(line)
            .filter(|_| state.title.is_none() && state.region == Region::Preamble)
        {
            state.title = Some(captures[1].to_string());
        } else {
            self.handle_content_line(line, state);
        }
    }

    fn handle_version_header(&self, title: &str, state: &mut ParserState) {
        state.finish_section();

        let tag = if let Some(captures) = BRACKETED_VERSION_PATTERN.captures(title) {
            VersionTag::from_token(&captures[1])
        } else if let Some(captures) = LINK_TARGET_HEADING_PATTERN.captures(title) {
            VersionTag::from_link_target(&captures[1])
        } else {
            let word = title.split_whitespace().next().unwrap_or_default();
            VersionTag::from_token(word.trim_end_matches([':', ',']))
        };

        state.current_version = Some(VersionSection::new(tag, title));
        state.region = Region::Body;
    }

    fn handle_category_header(&self, category: &str, state: &mut ParserState) {
        if let Some(section) = state.current_version.as_mut() {
            section.parsed.entry(category);
        }
        state.current_category = Some(category.to_string());
        state.pending_blanks = 0;
        state.region = Region::Category;
    }

    fn handle_content_line(&self, line: &str, state: &mut ParserState) {
        match state.region {
            Region::Preamble => state.description.push(line.to_string()),
            Region::Body => {
                state.body.push(line.to_string());
                if CHANGELOG_ITEM_PATTERN.is_match(line) {
                    if let Some(section) = state.current_version.as_mut() {
                        section.parsed.push(UNCATEGORIZED, line);
                    }
                }
            }
            Region::Category => self.handle_item_line(line, state),
        }
    }

    fn handle_item_line(&self, line: &str, state: &mut ParserState) {
        if line.trim().is_empty() {
            state.pending_blanks += 1;
            return;
        }
        let blanks = std::mem::take(&mut state.pending_blanks);
        let inside_fence = state.inside_fence;
        let (Some(section), Some(category)) =
            (state.current_version.as_mut(), state.current_category.as_deref())
        else {
            return;
        };

        let items = section.parsed.entry(category);
        let Some(last) = items.last_mut() else {
            items.push(line.to_string());
            return;
        };

        let starts_item = !inside_fence && CHANGELOG_ITEM_PATTERN.is_match(line);
        let starts_paragraph = !inside_fence && blanks > 0 && !is_indented(line);
        if starts_item || starts_paragraph {
            items.push(format!("{}{line}", "\n".repeat(blanks)));
        } else {
            last.push_str(&"\n".repeat(blanks + 1));
            last.push_str(line);
        }
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with("  ") || line.starts_with('\t')
}

/// Joins lines, dropping blank lines at both ends
fn join_trimmed(lines: &[String]) -> String {
    let start = lines.iter().position(|line| !line.trim().is_empty());
    let end = lines.iter().rposition(|line| !line.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Changelog

All notable changes to this project will be documented in this file.

## [Unreleased](https://github.com/atomist/test/compare/0.1.1...HEAD)

### Added

-   Publish TypeDoc when Node project is released
-   Increment version after release
    with a wrapped line

### Changed

-   Lein support now uses atomist.sh to build

## [0.1.1](https://github.com/atomist/test/compare/0.1.0...0.1.1) - 2018-05-10

Trigger release

### Changed

-   Version
";

    #[test]
    fn parses_title_description_and_sections() {
        let doc = Parser::new().parse(SAMPLE).unwrap();

        assert_eq!(doc.title, "Changelog");
        assert_eq!(
            doc.description.as_deref(),
            Some("All notable changes to this project will be documented in this file.")
        );
        assert_eq!(doc.versions.len(), 2);

        let open = &doc.versions[0];
        assert!(open.is_open());
        assert_eq!(
            open.title,
            "[Unreleased](https://github.com/atomist/test/compare/0.1.1...HEAD)"
        );
        assert_eq!(
            open.parsed.get("Added").unwrap(),
            [
                "-   Publish TypeDoc when Node project is released",
                "-   Increment version after release\n    with a wrapped line",
            ]
        );

        let released = &doc.versions[1];
        assert_eq!(released.version(), Some("0.1.1"));
        assert_eq!(released.body, "Trigger release");
        assert_eq!(released.parsed.get("Changed").unwrap(), ["-   Version"]);
    }

    #[test]
    fn accepts_milestone_and_unbracketed_headings() {
        let doc = Parser::new()
            .parse("# Changelog\n\n## Unreleased\n\n## [version9] - 2018-03-02\n\n## 1.0.0 - 2018-01-01\n")
            .unwrap();
        let tags: Vec<_> = doc.versions.iter().map(|v| v.tag.clone()).collect();
        assert_eq!(
            tags,
            vec![
                VersionTag::Unreleased,
                VersionTag::Released("version9".to_string()),
                VersionTag::Released("1.0.0".to_string()),
            ]
        );
    }

    #[test]
    fn stray_items_before_categories_stay_in_body() {
        let doc = Parser::new()
            .parse("# Changelog\n\n## [1.0.0]\n\nIntro\n\n-   stray item\n\n### Fixed\n\n-   a fix\n")
            .unwrap();
        let section = &doc.versions[0];
        assert_eq!(section.body, "Intro\n\n-   stray item");
        assert_eq!(section.parsed.get(UNCATEGORIZED).unwrap(), ["-   stray item"]);
        assert_eq!(section.parsed.get("Fixed").unwrap(), ["-   a fix"]);
    }

    #[test]
    fn headings_inside_code_fences_are_content() {
        let doc = Parser::new()
            .parse("# Changelog\n\n## [1.0.0]\n\n```\n## [not a version]\n```\n")
            .unwrap();
        assert_eq!(doc.versions.len(), 1);
        assert_eq!(doc.versions[0].body, "```\n## [not a version]\n```");
    }

    #[test]
    fn unterminated_fence_is_a_parse_failure() {
        let err = Parser::new()
            .parse("# Changelog\n\n```\n## [1.0.0]\n")
            .unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidFormat(3, _)));
    }

    #[test]
    fn dotted_labels_are_versions_and_bare_links_are_unreleased() {
        let doc = Parser::new()
            .parse("# Changelog\n\n## https://github.com/atomist/test/compare/1.0.0...HEAD\n\n## [beta.release] - 2020-02-02\n")
            .unwrap();
        assert_eq!(doc.versions[0].tag, VersionTag::Unreleased);
        assert_eq!(
            doc.versions[1].tag,
            VersionTag::Released("beta.release".to_string())
        );
        assert_eq!(doc.open_section().map(|s| s.title.as_str()), Some("https://github.com/atomist/test/compare/1.0.0...HEAD"));
    }

    #[test]
    fn category_prose_and_loose_items_keep_their_blank_lines() {
        let content = "# Changelog

## [1.0.0] - 2020-01-01

### Added

-   one

A note paragraph.

-   two

    continued after a blank line

```
code

more code
```
";
        let doc = Parser::new().parse(content).unwrap();
        let added = doc.versions[0].parsed.get("Added").unwrap();
        assert_eq!(added.len(), 4);
        assert_eq!(added[0], "-   one");
        assert_eq!(added[1], "\nA note paragraph.");
        assert_eq!(added[2], "\n-   two\n\n    continued after a blank line");
        assert_eq!(added[3], "\n```\ncode\n\nmore code\n```");
        assert_eq!(crate::formatter::render(&doc), content);
    }

    #[test]
    fn missing_title_defaults_to_changelog() {
        let doc = Parser::new().parse("## [1.0.0]\n").unwrap();
        assert_eq!(doc.title, "Changelog");
        assert!(doc.description.is_none());
    }
}
