//! Source-control collaborator for the changelog engine: reads commit
//! history from a working copy and commits the updated changelog.

pub mod config;
pub mod error;
pub mod repository;

pub use config::{AuthorInfo, Config, RealGitConfig};
pub use error::{GitError, Result, ResultExt};
pub use repository::{
    CommitRecord, RealGitRepository, Repository, generated_changelog_commits, repository_slug,
    web_url_from_remote,
};
