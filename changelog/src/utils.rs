use once_cell::sync::Lazy;
use regex::Regex;

pub static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[ \t]+(.+?)\s*$").expect("Failed to compile title regex"));

pub static VERSION_HEADER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^##[ \t]+(.+?)\s*$").expect("Failed to compile version header regex")
});

pub static CHANGELOG_CATEGORY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^###[ \t]+(.+?)\s*$").expect("Failed to compile category regex"));

pub static CHANGELOG_ITEM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}[-*+][ \t]+\S").expect("Failed to compile item regex"));

/// Bracketed token opening a version heading: `[1.2.0](...)`, `[Unreleased][]`
pub static BRACKETED_VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([^\[\]]+)\]").expect("Failed to compile bracketed version regex")
});

/// Heading that starts with a link target instead of a bracketed label:
/// `https://host/...` or `[](https://host/...)`. Captures the host.
pub static LINK_TARGET_HEADING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\[\]\()?<?https?://([^/\s>)]+)")
        .expect("Failed to compile link target heading regex")
});

pub static CODE_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(?:```|~~~)").expect("Failed to compile code fence regex"));

/// `[label]: url "optional title"`
pub static LINK_DEFINITION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^ {0,3}\[([^\[\]]+)\]:[ \t]*<?([^\s>]+)>?(?:[ \t]+(?:"[^"]*"|'[^']*'|\([^)]*\)))?[ \t]*$"#)
        .expect("Failed to compile link definition regex")
});

/// `[text]`, `[text][]` or `[text][label]`
pub static REFERENCE_LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\[\]]+)\](?:\[([^\[\]]*)\])?").expect("Failed to compile reference link regex")
});

pub static CHANGELOG_MARKER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[changelog:.*\]").expect("Failed to compile changelog marker regex")
});

pub static REFERENCE_UNRELEASED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\[Unreleased\]:[ \t]*(http.*/compare)/(\S+)\.{3}HEAD")
        .expect("Failed to compile reference unreleased regex")
});

pub static INLINE_COMPARE_UNRELEASED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^##[ \t]*\[Unreleased\]\((http.*/compare)/(\S+)\.{3}HEAD\)")
        .expect("Failed to compile inline compare unreleased regex")
});

pub static INLINE_TREE_UNRELEASED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^##[ \t]*\[Unreleased\]\((http.*)/tree/HEAD\)")
        .expect("Failed to compile inline tree unreleased regex")
});

/// Uppercases the first character, leaving the rest untouched
pub fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_do_not_overlap() {
        assert!(VERSION_HEADER_PATTERN.is_match("## [1.0.0] - 2020-01-01"));
        assert!(!VERSION_HEADER_PATTERN.is_match("### Added"));
        assert!(CHANGELOG_CATEGORY_PATTERN.is_match("### Added"));
        assert!(!TITLE_PATTERN.is_match("## [1.0.0]"));
        assert!(TITLE_PATTERN.is_match("# Change Log"));
    }

    #[test]
    fn upper_first_handles_unicode_and_empty() {
        assert_eq!(upper_first("this is it"), "This is it");
        assert_eq!(upper_first("élan"), "Élan");
        assert_eq!(upper_first(""), "");
    }
}
