use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with changelogs
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to read changelog file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to write changelog file {}: {1}", .0.display())]
    WriteError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse changelog: {0}")]
    ParseError(String),

    #[error("Invalid changelog format at line {0}: {1}")]
    InvalidFormat(usize, String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid configuration option {0}: {1}")]
    InvalidConfig(String, String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("{0}: {1}")]
    WithContext(String, Box<ChangelogError>),
}

impl ChangelogError {
    #[must_use]
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext(context.into(), Box::new(self))
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ReadError(e) => format!("File operation failed: {e}"),
            Self::WriteError(path, e) => {
                format!("Could not write {}: {e}", path.display())
            }
            Self::ParseError(msg) => format!("Failed to parse changelog: {msg}"),
            Self::InvalidFormat(line, msg) => {
                format!("Invalid changelog format at line {line}: {msg}")
            }
            Self::InvalidVersion(ver) => format!("Invalid version: {ver}"),
            Self::InvalidConfig(option, msg) => {
                format!("Configuration option '{option}' is invalid: {msg}")
            }
            Self::ConfigParse(e) => format!("Configuration file is not valid TOML: {e}"),
            Self::RegexError(e) => format!("Regular expression error: {e}"),
            Self::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }
}

/// Helper trait for adding context to results
pub trait ResultExt<T> {
    /// Add context to an error result from a string-producing closure
    fn with_context<C, F>(self, context: F) -> std::result::Result<T, ChangelogError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ChangelogError>,
{
    fn with_context<C, F>(self, context: F) -> std::result::Result<T, ChangelogError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| {
            let changelog_err: ChangelogError = err.into();
            changelog_err.with_context(context())
        })
    }
}
