use crate::error::{ChangelogError, ResultExt};
use crate::types::{Category, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-repository configuration file
pub const CONFIG_FILE_NAME: &str = ".changelog.toml";

pub const DEFAULT_FILE_NAME: &str = "CHANGELOG.md";

/// Configuration options for changelog updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangelogConfig {
    /// Changelog path relative to the repository root
    pub file: String,
    pub add_author: bool,
    /// Copy the released section into the release notes
    pub add_changelog_to_release: bool,
    pub announce: bool,
    pub announce_channel: Vec<AnnounceChannel>,
    pub map_added: Vec<String>,
    pub map_changed: Vec<String>,
    pub map_deprecated: Vec<String>,
    pub map_removed: Vec<String>,
    pub map_fixed: Vec<String>,
    pub map_security: Vec<String>,
    pub map_breaking: Vec<String>,
    pub skill: SkillId,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file: DEFAULT_FILE_NAME.to_string(),
            add_author: false,
            add_changelog_to_release: true,
            announce: false,
            announce_channel: Vec::new(),
            map_added: Vec::new(),
            map_changed: Vec::new(),
            map_deprecated: Vec::new(),
            map_removed: Vec::new(),
            map_fixed: Vec::new(),
            map_security: Vec::new(),
            map_breaking: Vec::new(),
            skill: SkillId::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnounceChannel {
    pub channel_name: String,
}

/// Identity written into the release commit trailer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillId {
    pub namespace: String,
    pub name: String,
}

impl Default for SkillId {
    fn default() -> Self {
        Self {
            namespace: "atomist".to_string(),
            name: "keep-a-changelog-skill".to_string(),
        }
    }
}

impl ChangelogConfig {
    /// Loads a TOML configuration file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        if config.file.trim().is_empty() {
            return Err(ChangelogError::InvalidConfig(
                "file".to_string(),
                "must not be empty".to_string(),
            ));
        }
        tracing::debug!(path = %path.display(), file = %config.file, "loaded configuration");
        Ok(config)
    }

    /// Loads `<dir>/.changelog.toml`, falling back to defaults when absent
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be loaded
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            tracing::debug!(dir = %dir.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Changelog location inside the repository rooted at `root`
    #[must_use]
    pub fn changelog_path(&self, root: &Path) -> PathBuf {
        root.join(&self.file)
    }

    fn category_patterns(&self) -> [(Category, &'static str, &[String]); 6] {
        [
            (Category::Added, "mapAdded", self.map_added.as_slice()),
            (Category::Changed, "mapChanged", self.map_changed.as_slice()),
            (Category::Deprecated, "mapDeprecated", self.map_deprecated.as_slice()),
            (Category::Removed, "mapRemoved", self.map_removed.as_slice()),
            (Category::Fixed, "mapFixed", self.map_fixed.as_slice()),
            (Category::Security, "mapSecurity", self.map_security.as_slice()),
        ]
    }
}

/// Commit-message patterns compiled from the `map*` options
#[derive(Debug, Clone, Default)]
pub struct CommitRules {
    categories: Vec<(Category, Vec<Regex>)>,
    breaking: Vec<Regex>,
}

impl CommitRules {
    /// # Errors
    /// Returns [`ChangelogError::InvalidConfig`] naming the option holding an
    /// invalid pattern
    pub fn compile(config: &ChangelogConfig) -> Result<Self> {
        let mut categories = Vec::with_capacity(Category::ALL.len());
        for (category, option, patterns) in config.category_patterns() {
            categories.push((category, compile_patterns(option, patterns)?));
        }
        Ok(Self {
            categories,
            breaking: compile_patterns("mapBreaking", &config.map_breaking)?,
        })
    }

    /// Categories whose patterns match `message`, in taxonomy order
    #[must_use]
    pub fn categories_for(&self, message: &str) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|(_, patterns)| patterns.iter().any(|p| p.is_match(message)))
            .map(|(category, _)| *category)
            .collect()
    }

    #[must_use]
    pub fn is_breaking(&self, message: &str) -> bool {
        self.breaking.iter().any(|p| p.is_match(message))
    }
}

fn compile_patterns(option: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .map_err(|e| ChangelogError::InvalidConfig(option.to_string(), e.to_string()))
        })
        .collect()
}
