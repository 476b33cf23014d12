use crate::error::{GitError, Result};
use git2::Config as GitConfig;
use std::path::Path;

/// Identity used to sign changelog commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorInfo {
    pub name: String,
    pub email: String,
}

impl AuthorInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

pub trait Config {
    /// Identity as seen from a working copy, repository settings first
    fn read_repository_config(path: &Path) -> Result<AuthorInfo>;
}

pub struct RealGitConfig {}

impl RealGitConfig {
    fn author_from(config: &GitConfig) -> Result<AuthorInfo> {
        let name = config
            .get_string("user.name")
            .map_err(|_| GitError::ConfigError("user.name is not set".to_string()))?;
        let email = config
            .get_string("user.email")
            .map_err(|_| GitError::ConfigError("user.email is not set".to_string()))?;
        Ok(AuthorInfo { name, email })
    }
}

impl Config for RealGitConfig {
    fn read_repository_config(path: &Path) -> Result<AuthorInfo> {
        let repo = git2::Repository::discover(path)?;
        let config = repo.config()?;
        Self::author_from(&config)
    }
}
