use std::path::PathBuf;
use thiserror::Error;

/// Git operation error type that provides detailed context about the error
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git2 error: {0}")]
    Git2Error(#[from] git2::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Remote error: {0}")]
    RemoteError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Path is outside the working copy: {}", .0.display())]
    PathOutsideRepository(PathBuf),

    #[error("{0}: {1}")]
    WithContext(String, Box<GitError>),
}

impl GitError {
    /// Add context to an error
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        GitError::WithContext(context.into(), Box::new(self))
    }

    /// Get a user-friendly message for command line display
    pub fn user_message(&self) -> String {
        match self {
            GitError::Git2Error(e) => {
                let msg = e.to_string();
                // Drop the class and code details git2 appends after ';'
                msg.split(';').next().map_or_else(
                    || format!("Git error: {msg}"),
                    |main_msg| format!("Git error: {}", main_msg.trim()),
                )
            }
            GitError::IoError(e) => format!("I/O error: {e}"),
            GitError::BranchNotFound(branch) => format!("Branch '{branch}' not found"),
            GitError::RepositoryError(msg) => format!("Repository error: {msg}"),
            GitError::RemoteError(msg) => format!("Remote error: {msg}"),
            GitError::ConfigError(msg) => format!("Git config error: {msg}"),
            GitError::PathOutsideRepository(path) => {
                format!("{} is not inside the working copy", path.display())
            }
            GitError::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GitError>;

/// Helper trait for adding context to results
pub trait ResultExt<T, E> {
    /// Add context to an error result with a string-producing closure
    fn with_context<C, F>(self, context: F) -> std::result::Result<T, GitError>
    where
        C: Into<String>,
        F: FnOnce() -> C;

    /// Add context directly from a string
    fn context<C: Into<String>>(self, context: C) -> std::result::Result<T, GitError>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<GitError>,
{
    fn with_context<C, F>(self, context: F) -> std::result::Result<T, GitError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| {
            let git_err: GitError = err.into();
            git_err.with_context(context())
        })
    }

    fn context<C: Into<String>>(self, context: C) -> std::result::Result<T, GitError> {
        self.map_err(|err| {
            let git_err: GitError = err.into();
            git_err.with_context(context)
        })
    }
}
