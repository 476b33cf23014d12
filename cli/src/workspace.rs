use crate::error::{CliError, Result};
use changelog::{Changelog, ChangelogConfig};
use git::{AuthorInfo, Config, RealGitConfig, RealGitRepository, Repository};
use std::path::{Path, PathBuf};

const FALLBACK_AUTHOR_NAME: &str = "Atomist Bot";
const FALLBACK_AUTHOR_EMAIL: &str = "bot@atomist.com";

/// The repository a command works on: its changelog, its configuration and,
/// when it is a git working copy, the repository itself.
pub struct Workspace {
    root: PathBuf,
    changelog: Changelog,
    repo: Option<RealGitRepository>,
}

impl Workspace {
    /// Opens `dir`, loading `config_path` or the repository's
    /// `.changelog.toml`
    pub fn load(dir: &Path, config_path: Option<&Path>) -> Result<Self> {
        let repo = match RealGitRepository::open_at(dir) {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "not a git working copy");
                None
            }
        };
        let root = repo
            .as_ref()
            .and_then(|repo| repo.workdir().ok())
            .unwrap_or_else(|| dir.to_path_buf());

        let config = match config_path {
            Some(path) => ChangelogConfig::load(path)?,
            None => ChangelogConfig::discover(&root)?,
        };
        tracing::debug!(root = %root.display(), file = %config.file, "loaded workspace");

        Ok(Self {
            changelog: Changelog::for_repository(&root, config),
            root,
            repo,
        })
    }

    pub fn changelog(&self) -> &Changelog {
        &self.changelog
    }

    pub fn config(&self) -> &ChangelogConfig {
        self.changelog.config()
    }

    pub fn repository(&self) -> Result<&RealGitRepository> {
        self.repo.as_ref().ok_or_else(|| {
            CliError::Other(format!("{} is not a git repository", self.root.display()))
        })
    }

    /// `explicit`, or the web URL of the `origin` remote
    pub fn repository_url(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(url) = explicit {
            return Ok(url.trim_end_matches('/').to_string());
        }
        self.repo
            .as_ref()
            .and_then(|repo| repo.remote_web_url("origin").ok())
            .ok_or(CliError::MissingRepositoryUrl)
    }

    /// `owner/name` for status messages, or the directory name
    pub fn slug(&self, repository_url: Option<&str>) -> String {
        repository_url
            .and_then(git::repository_slug)
            .or_else(|| {
                self.root
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Commits the changelog file as `identity`, or as the repository's
    /// configured user when there is none, returning the new SHA
    pub fn commit_changelog(&self, message: &str, identity: Option<(&str, &str)>) -> Result<String> {
        let repo = self.repository()?;
        let author = match identity {
            Some((name, email)) => AuthorInfo::new(name, email),
            None => RealGitConfig::read_repository_config(&self.root).unwrap_or_else(|e| {
                tracing::warn!(error = %e.user_message(), "no git identity configured, using fallback author");
                AuthorInfo::new(FALLBACK_AUTHOR_NAME, FALLBACK_AUTHOR_EMAIL)
            }),
        };
        tracing::debug!(name = %author.name, email = %author.email, "committing changelog");
        let sha = repo.commit_file(Path::new(&self.config().file), message, &author)?;
        Ok(sha)
    }
}
