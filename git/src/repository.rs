use crate::config::AuthorInfo;
use crate::error::{GitError, Result, ResultExt};
use git2::{BranchType, Oid, Repository as GitRepository, Signature, Sort, StatusOptions};
use std::path::{Path, PathBuf};

/// A commit together with the paths it touched relative to its first parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub files: Vec<PathBuf>,
}

impl CommitRecord {
    #[must_use]
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    /// Whether the commit changed `path` and nothing else
    #[must_use]
    pub fn touches_only(&self, path: &Path) -> bool {
        !self.files.is_empty() && self.files.iter().all(|file| file == path)
    }
}

pub trait Repository {
    /// Discovers the repository containing `path`
    fn open_at(path: &Path) -> Result<Self>
    where
        Self: Sized;
    fn workdir(&self) -> Result<PathBuf>;
    fn is_clean(&self) -> Result<bool>;
    fn current_branch(&self) -> Result<String>;
    fn default_branch(&self) -> Result<String>;
    fn head_sha(&self) -> Result<String>;
    /// Commits reachable from `to` but not from `from`, oldest first
    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>>;
    /// Stages `path` and commits it on `HEAD`, returning the new SHA
    fn commit_file(&self, path: &Path, message: &str, author: &AuthorInfo) -> Result<String>;
    /// Browser URL of a remote, e.g. `https://github.com/owner/repo`
    fn remote_web_url(&self, remote: &str) -> Result<String>;
}

pub struct RealGitRepository {
    repo: GitRepository,
}

impl RealGitRepository {
    // Helper method to find a branch from a list of possible branch names
    fn find_branch_from_candidates(&self, branch_names: &[&str], error_msg: &str) -> Result<String> {
        for &name in branch_names {
            if let Ok(branch) = self.repo.find_branch(name, BranchType::Local) {
                if let Ok(Some(branch_name)) = branch.name() {
                    return Ok(branch_name.to_string());
                }
            }
        }

        Err(GitError::BranchNotFound(error_msg.to_string()))
    }

    fn resolve_commit(&self, rev: &str) -> Result<Oid> {
        let object = self
            .repo
            .revparse_single(rev)
            .with_context(|| format!("Failed to resolve '{rev}'"))?;
        let commit = object
            .peel_to_commit()
            .with_context(|| format!("'{rev}' does not point to a commit"))?;
        Ok(commit.id())
    }

    fn record(&self, oid: Oid) -> Result<CommitRecord> {
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let files = diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(Path::to_path_buf)
            .collect();

        let author = commit.author();
        Ok(CommitRecord {
            sha: oid.to_string(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author_name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
            author_email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
            files,
        })
    }

    fn relative_to_workdir(&self, path: &Path) -> Result<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }
        let workdir = self.workdir()?;
        if let Ok(relative) = path.strip_prefix(&workdir) {
            return Ok(relative.to_path_buf());
        }
        let canonical_workdir = workdir.canonicalize()?;
        let canonical_path = path.canonicalize()?;
        canonical_path
            .strip_prefix(&canonical_workdir)
            .map(Path::to_path_buf)
            .map_err(|_| GitError::PathOutsideRepository(path.to_path_buf()))
    }
}

impl Repository for RealGitRepository {
    fn open_at(path: &Path) -> Result<Self> {
        let repo = GitRepository::discover(path).map_err(|e| {
            GitError::RepositoryError(format!(
                "Failed to open git repository at {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self { repo })
    }

    fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| GitError::RepositoryError("Repository has no working copy".to_string()))
    }

    fn is_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);

        let statuses = self.repo.statuses(Some(&mut options)).map_err(|e| {
            GitError::RepositoryError(format!("Failed to get repository status: {e}"))
        })?;

        Ok(statuses.is_empty())
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(GitError::RepositoryError("HEAD is not a branch".to_string()));
        }

        let branch_name = head
            .shorthand()
            .ok_or_else(|| GitError::RepositoryError("Invalid branch name".to_string()))?
            .to_string();

        Ok(branch_name)
    }

    fn default_branch(&self) -> Result<String> {
        if let Ok(reference) = self.repo.find_reference("refs/remotes/origin/HEAD") {
            if let Some(target) = reference.symbolic_target() {
                if let Some(branch) = target.strip_prefix("refs/remotes/origin/") {
                    return Ok(branch.to_string());
                }
            }
        }
        self.find_branch_from_candidates(&["main", "master", "develop"], "No default branch found")
    }

    fn head_sha(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitRecord>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(self.resolve_commit(to)?)?;
        if let Some(from) = from {
            revwalk.hide(self.resolve_commit(from)?)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(self.record(oid?)?);
        }
        tracing::debug!(from = ?from, to, count = commits.len(), "collected commits");
        Ok(commits)
    }

    fn commit_file(&self, path: &Path, message: &str, author: &AuthorInfo) -> Result<String> {
        let relative = self.relative_to_workdir(path)?;

        let mut index = self.repo.index()?;
        index
            .add_path(&relative)
            .with_context(|| format!("Failed to stage {}", relative.display()))?;
        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;

        let signature = Signature::now(&author.name, &author.email)?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .with_context(|| format!("Failed to commit {}", relative.display()))?;
        tracing::info!(sha = %oid, path = %relative.display(), "committed changelog");
        Ok(oid.to_string())
    }

    fn remote_web_url(&self, remote: &str) -> Result<String> {
        let found = self
            .repo
            .find_remote(remote)
            .with_context(|| format!("Remote '{remote}' not found"))?;
        let url = found
            .url()
            .ok_or_else(|| GitError::RemoteError(format!("Remote '{remote}' has no URL")))?;
        web_url_from_remote(url).ok_or_else(|| {
            GitError::RemoteError(format!("Cannot derive a web URL from '{url}'"))
        })
    }
}

/// SHAs of commits that changed the changelog and nothing else, i.e. the
/// commits this tool produced
#[must_use]
pub fn generated_changelog_commits(commits: &[CommitRecord], changelog: &Path) -> Vec<String> {
    commits
        .iter()
        .filter(|commit| commit.touches_only(changelog))
        .map(|commit| commit.sha.clone())
        .collect()
}

/// Converts `git@host:owner/repo.git`, `ssh://git@host/owner/repo.git` or
/// `https://user@host/owner/repo.git` into `https://host/owner/repo`
#[must_use]
pub fn web_url_from_remote(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    let (host, path) = if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("ssh://"))
        .or_else(|| url.strip_prefix("git://"))
    {
        let (authority, path) = rest.split_once('/')?;
        let host = authority.rsplit('@').next()?;
        let host = if url.starts_with("http") {
            host
        } else {
            host.split(':').next()?
        };
        (host, path)
    } else {
        let (authority, path) = url.split_once(':')?;
        (authority.rsplit('@').next()?, path)
    };

    if host.is_empty() || path.is_empty() || path.contains(':') {
        return None;
    }
    Some(format!("https://{host}/{path}"))
}

/// `owner/repo` from a web URL
#[must_use]
pub fn repository_slug(web_url: &str) -> Option<String> {
    let mut segments = web_url.trim_end_matches('/').rsplit('/');
    let name = segments.next().filter(|s| !s.is_empty())?;
    let owner = segments.next().filter(|s| !s.is_empty() && !s.contains(':'))?;
    Some(format!("{owner}/{name}"))
}
