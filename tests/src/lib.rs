//! Fixtures shared by the integration suites.

use git::{AuthorInfo, RealGitRepository, Repository};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const REPO_URL: &str = "https://github.com/atomist/test";

/// A changelog linking its `Unreleased` heading through a definition line
pub const REFERENCE_CHANGELOG: &str = "# Changelog

## [Unreleased][]

[Unreleased]: https://x/compare/0.1.1...HEAD

### Added

-   Reference style. [#7](https://x/issues/7)

## [0.1.1][] - 2018-05-10

### Fixed

-   Old bug. [#5](https://x/issues/5)
";

/// A changelog that has never been released
pub const TREE_CHANGELOG: &str = "# Changelog

## [Unreleased](https://x/tree/HEAD)

### Added

-   First feature. [#1](https://x/issues/1)
";

pub fn developer() -> AuthorInfo {
    AuthorInfo::new("Dev", "12345+dev@users.noreply.github.com")
}

/// An empty repository with no commits
pub fn scratch_repository() -> (TempDir, RealGitRepository) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    git2::Repository::init(dir.path()).expect("Failed to init repository");
    let repo = RealGitRepository::open_at(dir.path()).expect("Failed to open repository");
    (dir, repo)
}

/// Writes `content` to `file` and commits it, returning the new SHA
pub fn commit_change(
    repo: &RealGitRepository,
    root: &Path,
    file: &str,
    content: &str,
    message: &str,
) -> String {
    let path = root.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write file");
    repo.commit_file(Path::new(file), message, &developer())
        .expect("Failed to commit change")
}
