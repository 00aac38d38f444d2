//! Configuration management for gcph.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::similarity::DEFAULT_LINE_THRESHOLD;

/// gcph configuration loaded from `<config_dir>/gcph/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Session defaults.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Duplicate detection tuning.
    #[serde(default)]
    pub similarity: SimilarityConfig,

    /// Persisted file locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// External programs.
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Default location of the config file, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gcph").join("config.toml"))
    }

    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// What the command loop does with a failed command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Print the error and keep reading commands.
    #[default]
    Print,
    /// Abort the process.
    Raise,
}

/// Session defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Error handling policy at the command boundary.
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Print replay actions instead of running them.
    #[serde(default)]
    pub dry_run: bool,

    /// Classify merge commits instead of skipping them.
    #[serde(default)]
    pub include_merges: bool,

    /// List blacklisted candidates.
    #[serde(default)]
    pub show_blacklist: bool,

    /// Base branch used when `onto` is never given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_onto: Option<String>,
}

/// Duplicate detection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Diffs longer than this many characters are compared by line.
    #[serde(default = "default_line_threshold")]
    pub line_threshold: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            line_threshold: default_line_threshold(),
        }
    }
}

const fn default_line_threshold() -> usize {
    DEFAULT_LINE_THRESHOLD
}

/// Persisted file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Blacklist file; defaults to `~/.gcph_blacklist`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklist_file: Option<PathBuf>,

    /// History file; defaults to `~/.gcph_history`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    /// Number of history lines kept.
    #[serde(default = "default_history_length")]
    pub history_length: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            blacklist_file: None,
            history_file: None,
            history_length: default_history_length(),
        }
    }
}

impl PathsConfig {
    /// Resolved blacklist location.
    #[must_use]
    pub fn blacklist_path(&self) -> Option<PathBuf> {
        self.blacklist_file
            .clone()
            .or_else(|| home_file(".gcph_blacklist"))
    }

    /// Resolved history location.
    #[must_use]
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| home_file(".gcph_history"))
    }
}

fn home_file(name: &str) -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(name))
}

const fn default_history_length() -> usize {
    1000
}

/// External programs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Two-file comparison tool, optionally with arguments.
    #[serde(default = "default_merge_tool")]
    pub merge_tool: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            merge_tool: default_merge_tool(),
        }
    }
}

fn default_merge_tool() -> String {
    "meld".into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.error_policy, ErrorPolicy::Print);
        assert!(!config.general.dry_run);
        assert!(!config.general.include_merges);
        assert_eq!(config.similarity.line_threshold, 10_000);
        assert_eq!(config.paths.history_length, 1000);
        assert_eq!(config.tools.merge_tool, "meld");
    }

    #[test]
    fn test_config_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let config = Config {
            general: GeneralConfig {
                error_policy: ErrorPolicy::Raise,
                dry_run: true,
                include_merges: true,
                show_blacklist: false,
                default_onto: Some("origin/main".into()),
            },
            similarity: SimilarityConfig {
                line_threshold: 500,
            },
            paths: PathsConfig {
                blacklist_file: Some(temp.path().join("bl")),
                history_file: None,
                history_length: 50,
            },
            tools: ToolsConfig {
                merge_tool: "code --diff --wait".into(),
            },
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.general.error_policy, ErrorPolicy::Raise);
        assert!(loaded.general.dry_run);
        assert_eq!(loaded.general.default_onto.as_deref(), Some("origin/main"));
        assert_eq!(loaded.similarity.line_threshold, 500);
        assert_eq!(loaded.paths.blacklist_path(), Some(temp.path().join("bl")));
        assert_eq!(loaded.paths.history_length, 50);
        assert_eq!(loaded.tools.merge_tool, "code --diff --wait");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[general]\nerror_policy = \"raise\"\n").unwrap();
        assert_eq!(config.general.error_policy, ErrorPolicy::Raise);
        assert_eq!(config.similarity.line_threshold, 10_000);
        assert_eq!(config.tools.merge_tool, "meld");
    }

    #[test]
    fn test_missing_config_returns_default() {
        let config = Config::load("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.tools.merge_tool, "meld");
    }
}
