//! Turns issues, pull requests and pushed commits into changelog candidates.
//!
//! Issues and pull requests are classified by their `changelog:<category>`
//! labels. Commits are classified by `[changelog:<category>]` markers in the
//! message and by the configured commit rules.

use crate::config::CommitRules;
use crate::status::HandlerStatus;
use crate::types::{Author, Category, ChangelogEntry, ClassifiedEntry, Qualifier};
use crate::utils::CHANGELOG_MARKER_PATTERN;
use serde::{Deserialize, Serialize};

const LABEL_PREFIX: &str = "changelog:";
const BREAKING_LABEL: &str = "breaking";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    #[must_use]
    pub fn web_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }

    /// Issues and pull requests share the `issues/<n>` permalink
    #[must_use]
    pub fn issue_url(&self, number: u64) -> String {
        format!("{}/issues/{number}", self.web_url())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInfo {
    pub repo: RepoRef,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub closed_by: Option<Author>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub repo: RepoRef,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub merged: bool,
    #[serde(default)]
    pub commit_authors: Vec<Author>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub url: String,
    #[serde(default)]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushInfo {
    pub repo: RepoRef,
    pub branch: String,
    pub default_branch: String,
    pub commits: Vec<CommitInfo>,
}

/// Either candidates to merge or the reason nothing needs to happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Entries(Vec<ClassifiedEntry>),
    Ignored(HandlerStatus),
}

impl Classification {
    fn single(entry: ClassifiedEntry) -> Self {
        Self::Entries(vec![entry])
    }
}

/// Categories named by `changelog:<category>` labels, in label order
#[must_use]
pub fn categories_from_labels(labels: &[String]) -> Vec<Category> {
    let mut categories = Vec::new();
    for label in labels {
        let Some(name) = label.strip_prefix(LABEL_PREFIX) else {
            continue;
        };
        match Category::from_name(name) {
            Some(category) if !categories.contains(&category) => categories.push(category),
            Some(_) => {}
            None => tracing::warn!(label = %label, "ignoring unknown changelog category label"),
        }
    }
    categories
}

fn has_breaking_label(labels: &[String]) -> bool {
    labels
        .iter()
        .any(|label| label.eq_ignore_ascii_case(BREAKING_LABEL))
}

fn labelled_entry(
    repo: &RepoRef,
    number: u64,
    title: &str,
    labels: &[String],
    authors: Vec<Author>,
) -> Classification {
    let categories = categories_from_labels(labels);
    if categories.is_empty() {
        return Classification::Ignored(
            HandlerStatus::success(format!("No changelog labels on #{number}")).hidden(),
        );
    }

    let mut entry = ChangelogEntry::new(title, format!("#{number}"), repo.issue_url(number));
    if has_breaking_label(labels) {
        entry = entry.with_qualifier(Qualifier::Breaking);
    }
    entry.authors = authors;
    Classification::single(ClassifiedEntry::new(entry, categories))
}

#[must_use]
pub fn entry_for_issue(issue: &IssueInfo) -> Classification {
    let authors = issue.closed_by.iter().cloned().collect();
    labelled_entry(&issue.repo, issue.number, &issue.title, &issue.labels, authors)
}

/// Pull requests closed without merging are ignored
#[must_use]
pub fn entry_for_pull_request(pr: &PullRequestInfo) -> Classification {
    if !pr.merged {
        return Classification::Ignored(
            HandlerStatus::success("Pull request closed but not merged. Ignoring...").hidden(),
        );
    }

    let mut authors: Vec<Author> = Vec::with_capacity(pr.commit_authors.len());
    for author in &pr.commit_authors {
        if !authors.iter().any(|a| a.login == author.login) {
            authors.push(author.clone());
        }
    }
    labelled_entry(&pr.repo, pr.number, &pr.title, &pr.labels, authors)
}

/// First message line without lower-case `[changelog:...]` markers.
/// Markers in other cases still classify the commit but stay in the title.
#[must_use]
pub fn commit_title(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default();
    CHANGELOG_MARKER_PATTERN
        .replace_all(first_line, "")
        .trim()
        .to_string()
}

/// Candidate for a commit, or `None` when nothing classifies it
#[must_use]
pub fn entry_for_commit(commit: &CommitInfo, rules: &CommitRules) -> Option<ClassifiedEntry> {
    let lowered = commit.message.to_lowercase();
    let mut categories: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|category| lowered.contains(&format!("[{LABEL_PREFIX}{}]", category.label())))
        .collect();
    for category in rules.categories_for(&commit.message) {
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    if categories.is_empty() {
        tracing::debug!(sha = %commit.sha, "commit matches no changelog category");
        return None;
    }

    let label: String = commit.sha.chars().take(7).collect();
    let mut entry = ChangelogEntry::new(commit_title(&commit.message), label, commit.url.clone());
    if rules.is_breaking(&commit.message) {
        entry = entry.with_qualifier(Qualifier::Breaking);
    }
    if let Some(author) = &commit.author {
        entry = entry.with_author(author.clone());
    }
    Some(ClassifiedEntry::new(entry, categories))
}

/// Accumulates candidates across every commit of a push to the default
/// branch
#[must_use]
pub fn entries_for_push(push: &PushInfo, rules: &CommitRules) -> Classification {
    if push.branch != push.default_branch {
        return Classification::Ignored(
            HandlerStatus::success("Ignoring pushes to non-default branch").hidden(),
        );
    }

    let entries: Vec<ClassifiedEntry> = push
        .commits
        .iter()
        .filter_map(|commit| entry_for_commit(commit, rules))
        .collect();

    if entries.is_empty() {
        Classification::Ignored(
            HandlerStatus::success(format!("No changelog entries in push to {}", push.repo.slug()))
                .hidden(),
        )
    } else {
        Classification::Entries(entries)
    }
}
