use crate::types::*;
use crate::utils::upper_first;

// --- Traits ---

pub trait EntryFormatter: Send + Sync {
    fn format(&self, entry: &ChangelogEntry) -> String;
}

pub trait SectionFormatter: Send + Sync {
    fn format(&self, section: &VersionSection) -> String;
}

// Entry Formatter (Markdown)

/// Renders an entry as a Keep-a-Changelog list item:
/// `-   **BREAKING** Title. [label](url) by [@login](https://github.com/login)`
#[derive(Debug, Clone, Default)]
pub struct MarkdownEntryFormatter {
    pub include_authors: bool,
}

impl MarkdownEntryFormatter {
    #[must_use]
    pub const fn new(include_authors: bool) -> Self {
        Self { include_authors }
    }

    fn qualifier_prefix(entry: &ChangelogEntry) -> String {
        if entry.qualifiers.is_empty() {
            return String::new();
        }
        let markers: Vec<String> = entry.qualifiers.iter().map(|q| q.marker()).collect();
        format!("{} ", markers.join(" "))
    }

    fn sentence(title: &str) -> String {
        let title = title.trim();
        let title = if title.ends_with('.') {
            title.to_string()
        } else {
            format!("{title}.")
        };
        upper_first(&title)
    }

    fn authors_clause(entry: &ChangelogEntry) -> String {
        let mut logins: Vec<&str> = Vec::with_capacity(entry.authors.len());
        for author in &entry.authors {
            let login = author.login.trim();
            if !login.is_empty() && !logins.contains(&login) {
                logins.push(login);
            }
        }
        if logins.is_empty() {
            return String::new();
        }
        let links: Vec<String> = logins
            .iter()
            .map(|login| format!("[@{login}](https://github.com/{login})"))
            .collect();
        format!(" by {}", links.join(", "))
    }
}

impl EntryFormatter for MarkdownEntryFormatter {
    fn format(&self, entry: &ChangelogEntry) -> String {
        let mut line = format!(
            "-   {}{} [{}]({})",
            Self::qualifier_prefix(entry),
            Self::sentence(&entry.title),
            entry.label,
            entry.url
        );
        if self.include_authors {
            line.push_str(&Self::authors_clause(entry));
        }
        line
    }
}

// Section Formatter (Markdown)
#[derive(Debug, Clone)]
pub struct MarkdownSectionFormatter;

impl SectionFormatter for MarkdownSectionFormatter {
    fn format(&self, section: &VersionSection) -> String {
        let mut blocks: Vec<String> = Vec::with_capacity(section.parsed.ordered().len() + 1);
        if !section.body.trim().is_empty() {
            blocks.push(section.body.clone());
        }
        for (category, lines) in section.parsed.ordered() {
            if lines.is_empty() {
                blocks.push(format!("### {category}"));
            } else {
                blocks.push(format!("### {category}\n\n{}", lines.join("\n")));
            }
        }
        blocks.join("\n\n")
    }
}

/// Body and categories of a section, without its heading
#[must_use]
pub fn render_section_content(section: &VersionSection) -> String {
    MarkdownSectionFormatter.format(section)
}

/// Renders a document back to Markdown.
///
/// Placeholder `0.0.0` sections are skipped, categories follow the
/// taxonomy order and the output ends with exactly one newline.
#[must_use]
pub fn render(document: &ChangelogDocument) -> String {
    let mut content = String::with_capacity(4096);
    content.push_str("# ");
    content.push_str(&document.title);

    if let Some(description) = document.description.as_deref().filter(|d| !d.trim().is_empty()) {
        content.push_str("\n\n");
        content.push_str(description);
    }

    for section in document.versions.iter().filter(|s| !s.tag.is_placeholder()) {
        content.push_str("\n\n## ");
        content.push_str(&section.title);

        let section_content = render_section_content(section);
        if !section_content.is_empty() {
            content.push_str("\n\n");
            content.push_str(&section_content);
        }
    }

    let trimmed = content.trim_end().len();
    content.truncate(trimmed);
    content.push('\n');
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn entry() -> ChangelogEntry {
        ChangelogEntry::new(
            "this is a test label",
            "#1",
            "https://github.com/atomist/test/issues/1",
        )
        .with_category(Category::Added)
    }

    #[test]
    fn formats_plain_entry() {
        let line = MarkdownEntryFormatter::new(false).format(&entry());
        assert_eq!(
            line,
            "-   This is a test label. [#1](https://github.com/atomist/test/issues/1)"
        );
    }

    #[test]
    fn formats_qualifiers_and_deduplicated_authors() {
        let entry = entry()
            .with_qualifier(Qualifier::Breaking)
            .with_author(Author::new("foo"))
            .with_author(Author::new("bar"))
            .with_author(Author::new("foo"));
        let line = MarkdownEntryFormatter::new(true).format(&entry);
        assert_eq!(
            line,
            "-   **BREAKING** This is a test label. [#1](https://github.com/atomist/test/issues/1) by [@foo](https://github.com/foo), [@bar](https://github.com/bar)"
        );
    }

    #[test]
    fn suppresses_authors_when_disabled() {
        let entry = entry().with_author(Author::new("foo"));
        let line = MarkdownEntryFormatter::new(false).format(&entry);
        assert!(!line.contains("@foo"));
    }

    #[test]
    fn keeps_existing_trailing_period() {
        let entry = ChangelogEntry::new("Done.", "abc1234", "https://x/commit/abc1234");
        let line = MarkdownEntryFormatter::default().format(&entry);
        assert_eq!(line, "-   Done. [abc1234](https://x/commit/abc1234)");
    }

    #[test]
    fn renders_categories_in_taxonomy_order() {
        let mut section = VersionSection::new(VersionTag::Unreleased, "[Unreleased](https://x/tree/HEAD)");
        section.parsed.push("Security", "-   s");
        section.parsed.push("Added", "-   a");
        section.parsed.push("Fixed", "-   f");
        let doc = ChangelogDocument {
            versions: vec![section],
            ..ChangelogDocument::default()
        };

        assert_eq!(
            render(&doc),
            "# Changelog\n\n## [Unreleased](https://x/tree/HEAD)\n\n### Added\n\n-   a\n\n### Fixed\n\n-   f\n\n### Security\n\n-   s\n"
        );
    }

    #[test]
    fn skips_placeholder_sections() {
        let doc = ChangelogDocument {
            versions: vec![VersionSection::new(VersionTag::from_token("0.0.0"), "[0.0.0]")],
            ..ChangelogDocument::default()
        };
        assert_eq!(render(&doc), "# Changelog\n");
    }

    #[test]
    fn parse_then_render_reproduces_document() {
        let content = "# Changelog

Intro text.

## [Unreleased](https://x/compare/0.1.0...HEAD)

### Added

-   One
-   Two

## [0.1.0](https://x/tree/0.1.0) - 2018-05-10

Initial release

### Fixed

-   Three
";
        let doc = Parser::new().parse(content).unwrap();
        assert_eq!(render(&doc), content);
    }

    #[test]
    fn render_is_stable_across_parse() {
        let mut open = VersionSection::new(VersionTag::Unreleased, "[Unreleased](https://x/tree/HEAD)");
        open.parsed.push("Fixed", "-   f");
        open.parsed.push("Changed", "-   c");
        let mut released = VersionSection::new(VersionTag::from_token("1.0.0"), "[1.0.0](https://x/tree/1.0.0) - 2020-01-01");
        released.body = "Notes".to_string();
        released.parsed.push("Removed", "-   r");
        let doc = ChangelogDocument {
            title: "Changelog".to_string(),
            description: Some("About.".to_string()),
            versions: vec![open, released],
        };

        let rendered = render(&doc);
        let reparsed = Parser::new().parse(&rendered).unwrap();
        assert_eq!(render(&reparsed), rendered);
    }
}
