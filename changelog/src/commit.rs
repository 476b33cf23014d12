//! Commit messages for changelog updates. Every message carries the
//! `[atomist:generated]` trailer so generated commits can be recognised.

use crate::config::SkillId;
use crate::types::ClassifiedEntry;

pub const GENERATED_TRAILER: &str = "[atomist:generated]";

/// `Changelog: #1 to added, fixed`
#[must_use]
pub fn entry_commit_message(entry: &ClassifiedEntry) -> String {
    format!(
        "Changelog: {} to {}\n\n{GENERATED_TRAILER}",
        entry.entry.label,
        entry.category_labels()
    )
}

/// One list item per entry, with the singular subject for a single entry
#[must_use]
pub fn batch_commit_message(entries: &[ClassifiedEntry]) -> String {
    let subject = if entries.len() == 1 {
        "Add changelog entry"
    } else {
        "Add changelog entries"
    };
    let items: Vec<String> = entries
        .iter()
        .map(|e| format!("-   {} to {}", e.entry.label, e.category_labels()))
        .collect();
    format!("{subject}\n\n{}\n\n{GENERATED_TRAILER}", items.join("\n"))
}

#[must_use]
pub fn release_commit_message(version: &str, skill: &SkillId) -> String {
    format!(
        "Changelog: add release {version}\n\n{GENERATED_TRAILER} [atomist-skill:{}/{}]",
        skill.namespace, skill.name
    )
}

/// Name and email of the first entry author that has both, used to sign
/// the changelog commit
#[must_use]
pub fn commit_identity(entries: &[ClassifiedEntry]) -> Option<(&str, &str)> {
    entries
        .iter()
        .flat_map(|e| e.entry.authors.iter())
        .find_map(|author| match (author.name.as_deref(), author.email.as_deref()) {
            (Some(name), Some(email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
                Some((name, email))
            }
            _ => None,
        })
}

/// Whether `message` was produced by one of the builders above
#[must_use]
pub fn is_generated(message: &str) -> bool {
    message.contains(GENERATED_TRAILER)
}
