//! Rewrites reference-style links into inline links.
//!
//! The structural parser groups content by headings, so standalone
//! `[label]: url` definition lines would be dropped when a document is
//! re-rendered. Inlining them first keeps every link intact. Documents
//! without definitions pass through unchanged.

use crate::utils::{
    CHANGELOG_ITEM_PATTERN, CODE_FENCE_PATTERN, LINK_DEFINITION_PATTERN, REFERENCE_LINK_PATTERN,
};
use std::collections::HashMap;

/// Tracks fenced and indented code blocks while scanning lines in order.
/// Indented lines continue a list item rather than open a code block.
#[derive(Debug)]
struct CodeBlocks {
    in_fence: bool,
    in_indented: bool,
    previous_blank: bool,
    in_list: bool,
}

impl CodeBlocks {
    fn new() -> Self {
        Self {
            in_fence: false,
            in_indented: false,
            previous_blank: true,
            in_list: false,
        }
    }

    /// Whether `line` belongs to a code block, fence markers included
    fn is_code(&mut self, line: &str) -> bool {
        let blank = line.trim().is_empty();
        let code = if CODE_FENCE_PATTERN.is_match(line) {
            self.in_fence = !self.in_fence;
            true
        } else if self.in_fence {
            true
        } else if !blank && is_indented(line) && (self.in_indented || (self.previous_blank && !self.in_list)) {
            self.in_indented = true;
            true
        } else {
            if !blank {
                self.in_indented = false;
                if CHANGELOG_ITEM_PATTERN.is_match(line) {
                    self.in_list = true;
                } else if !line.starts_with([' ', '\t']) {
                    self.in_list = false;
                }
            }
            false
        };
        self.previous_blank = blank;
        code
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

/// Link definitions of a document, keyed by normalized label
#[derive(Debug, Default)]
struct Definitions {
    urls: HashMap<String, String>,
    lines: Vec<usize>,
}

impl Definitions {
    fn collect(lines: &[&str]) -> Self {
        let mut definitions = Self::default();
        let mut code = CodeBlocks::new();

        for (idx, line) in lines.iter().enumerate() {
            if code.is_code(line) {
                continue;
            }
            if let Some(captures) = LINK_DEFINITION_PATTERN.captures(line) {
                let label = normalize_label(&captures[1]);
                // First definition of a label wins
                definitions
                    .urls
                    .entry(label)
                    .or_insert_with(|| captures[2].to_string());
                definitions.lines.push(idx);
            }
        }

        definitions
    }

    fn url(&self, label: &str) -> Option<&str> {
        self.urls.get(&normalize_label(label)).map(String::as_str)
    }

    fn is_definition(&self, idx: usize) -> bool {
        self.lines.binary_search(&idx).is_ok()
    }
}

fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns `content` with every resolvable reference link inlined and the
/// definition lines removed.
#[must_use]
pub fn inline_reference_links(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let definitions = Definitions::collect(&lines);
    if definitions.urls.is_empty() {
        return content.to_string();
    }

    tracing::debug!(
        definitions = definitions.urls.len(),
        "inlining reference-style links"
    );

    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut code = CodeBlocks::new();
    let mut after_removed = false;

    for (idx, line) in lines.iter().enumerate() {
        if code.is_code(line) {
            after_removed = false;
            output.push((*line).to_string());
            continue;
        }
        if definitions.is_definition(idx) {
            after_removed = true;
            continue;
        }
        if line.trim().is_empty() {
            // Do not leave a double blank line where a definition used to be
            let previous_blank = output.last().is_none_or(|last| last.trim().is_empty());
            if after_removed && previous_blank {
                continue;
            }
            output.push((*line).to_string());
            continue;
        }
        after_removed = false;
        output.push(inline_line(line, &definitions));
    }

    while output.last().is_some_and(|last| last.trim().is_empty()) {
        output.pop();
    }

    let mut result = output.join("\n");
    if content.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn inline_line(line: &str, definitions: &Definitions) -> String {
    let mut rewritten = String::with_capacity(line.len() + 32);
    let mut last = 0;

    for captures in REFERENCE_LINK_PATTERN.captures_iter(line) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let text = &captures[1];
        let explicit_label = captures.get(2).map(|label| label.as_str());

        // `[text](url)` is already inline
        if explicit_label.is_none() && line[whole.end()..].starts_with('(') {
            continue;
        }

        let label = match explicit_label {
            Some(label) if !label.trim().is_empty() => label,
            _ => text,
        };
        let Some(url) = definitions.url(label) else {
            continue;
        };

        rewritten.push_str(&line[last..whole.start()]);
        rewritten.push('[');
        rewritten.push_str(text);
        rewritten.push_str("](");
        rewritten.push_str(url);
        rewritten.push(')');
        last = whole.end();
    }

    rewritten.push_str(&line[last..]);
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_STYLE: &str = "# Change Log

## [Unreleased][]

[Unreleased]: https://github.com/atomist/atomist-sdm/compare/0.1.1...HEAD

### Added

-   Publish TypeDoc when Node project is released

## [0.1.1][] - 2018-05-10

[0.1.1]: https://github.com/atomist/atomist-sdm/compare/0.1.0...0.1.1

Trigger release
";

    #[test]
    fn inlines_headings_and_drops_definitions() {
        let inlined = inline_reference_links(REFERENCE_STYLE);
        assert_eq!(
            inlined,
            "# Change Log

## [Unreleased](https://github.com/atomist/atomist-sdm/compare/0.1.1...HEAD)

### Added

-   Publish TypeDoc when Node project is released

## [0.1.1](https://github.com/atomist/atomist-sdm/compare/0.1.0...0.1.1) - 2018-05-10

Trigger release
"
        );
    }

    #[test]
    fn is_idempotent() {
        let once = inline_reference_links(REFERENCE_STYLE);
        assert_eq!(inline_reference_links(&once), once);
    }

    #[test]
    fn leaves_inline_links_and_unknown_references_alone() {
        let content = "-   See [docs](https://x/docs) and [missing][ref] and [x][]\n";
        assert_eq!(inline_reference_links(content), content);
    }

    #[test]
    fn resolves_explicit_and_shortcut_labels_case_insensitively() {
        let content = "Read [the guide][Guide] or [guide].\n\n[guide]: https://x/guide\n";
        assert_eq!(
            inline_reference_links(content),
            "Read [the guide](https://x/guide) or [guide](https://x/guide).\n"
        );
    }

    #[test]
    fn ignores_fenced_code() {
        let content = "```\n[a]: https://x/a\n```\n\nuse [a]\n";
        assert_eq!(inline_reference_links(content), content);
    }

    #[test]
    fn ignores_indented_code_but_not_list_continuations() {
        let content = "Example:

    see [a] for details

-   Item

    continued in [a]

[a]: https://x/a
";
        assert_eq!(
            inline_reference_links(content),
            "Example:

    see [a] for details

-   Item

    continued in [a](https://x/a)
"
        );
    }
}
