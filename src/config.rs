//! Scrambler configuration.
//!
//! Settings are read from an optional TOML file and control how random names
//! are generated and which files are never considered for scrambling.
//!
//! # Configuration File Format
//!
//! ```toml
//! [names]
//! length = 8
//! log_suffix = "_scramble.log"
//!
//! [filters]
//! reserved_extensions = ["py", "pyc", "log"]
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.tmp", "draft_*"]
//! ```
//!
//! Every key is optional; missing keys fall back to the defaults shown above.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of the log files written by this tool. Always reserved.
pub const LOG_EXTENSION: &str = "log";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax, structure, or value.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern {
        /// The glob pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScramblerConfig {
    /// Random name and log name settings.
    #[serde(default)]
    pub names: NameSettings,

    /// Rules deciding which files are never scrambled.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Settings for generated file names and log names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameSettings {
    /// Number of random characters in a generated name.
    #[serde(default = "default_name_length")]
    pub length: usize,

    /// Suffix appended to the directory name to form the default log name.
    #[serde(default = "default_log_suffix")]
    pub log_suffix: String,
}

fn default_name_length() -> usize {
    8
}

fn default_log_suffix() -> String {
    "_scramble.log".to_string()
}

impl Default for NameSettings {
    fn default() -> Self {
        Self {
            length: default_name_length(),
            log_suffix: default_log_suffix(),
        }
    }
}

/// Exclusion rules applied before any matching filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Extensions (without the leading dot) of files belonging to the tool itself.
    #[serde(default = "default_reserved_extensions")]
    pub reserved_extensions: Vec<String>,

    /// Additional user exclusions.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

fn default_reserved_extensions() -> Vec<String> {
    vec!["py".to_string(), "pyc".to_string(), LOG_EXTENSION.to_string()]
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            reserved_extensions: default_reserved_extensions(),
            exclude: ExcludeRules::default(),
        }
    }
}

/// User-supplied names and patterns that are never scrambled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ScramblerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.scramblerrc.toml` in the current directory
    /// 3. Look for `~/.config/scrambler/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any file found fails to parse or validate.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".scramblerrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("scrambler")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.names.length == 0 {
            return Err(ConfigError::ConfigInvalid(
                "names.length must be greater than zero".to_string(),
            ));
        }
        if self.names.log_suffix.is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "names.log_suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Compile the exclusion rules for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob pattern is invalid.
    pub fn compile_exclusions(&self) -> Result<CompiledExclusions, ConfigError> {
        CompiledExclusions::new(&self.filters)
    }
}

/// Pre-compiled exclusion rules, applied to bare file names.
#[derive(Debug, Clone)]
pub struct CompiledExclusions {
    reserved_extensions: HashSet<String>,
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
}

impl Default for CompiledExclusions {
    fn default() -> Self {
        Self {
            reserved_extensions: normalize_reserved(&default_reserved_extensions()),
            exclude_filenames: HashSet::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Reserved extensions are stored with their leading dot, the way
/// `matcher::split_extension` reports them. `.log` is always present.
fn normalize_reserved(extensions: &[String]) -> HashSet<String> {
    let mut reserved: HashSet<String> = extensions
        .iter()
        .map(|ext| crate::matcher::normalize_extension(ext))
        .collect();
    reserved.insert(crate::matcher::normalize_extension(LOG_EXTENSION));
    reserved
}

impl CompiledExclusions {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            reserved_extensions: normalize_reserved(&rules.reserved_extensions),
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_patterns,
        })
    }

    /// Check whether a file name is excluded from scrambling.
    ///
    /// Checks, in order:
    /// 1. Hidden files (leading `.`)
    /// 2. Reserved extension (exact, case-sensitive)
    /// 3. Exact filename match
    /// 4. Glob pattern match
    pub fn is_excluded(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') {
            return true;
        }

        let (_, extension) = crate::matcher::split_extension(file_name);
        if self.reserved_extensions.contains(extension) {
            return true;
        }

        if self.exclude_filenames.contains(file_name) {
            return true;
        }

        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ScramblerConfig::default();
        assert_eq!(config.names.length, 8);
        assert_eq!(config.names.log_suffix, "_scramble.log");
        assert_eq!(config.filters.reserved_extensions, vec!["py", "pyc", "log"]);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ScramblerConfig::from_toml_str("").unwrap();
        assert_eq!(config.names.length, 8);
        assert_eq!(config.filters.reserved_extensions.len(), 3);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = ScramblerConfig::from_toml_str(
            r#"
            [names]
            length = 12

            [filters.exclude]
            filenames = ["Thumbs.db"]
            "#,
        )
        .unwrap();

        assert_eq!(config.names.length, 12);
        assert_eq!(config.names.log_suffix, "_scramble.log");
        assert_eq!(config.filters.exclude.filenames, vec!["Thumbs.db"]);
    }

    #[test]
    fn test_zero_length_rejected() {
        let result = ScramblerConfig::from_toml_str("[names]\nlength = 0\n");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = ScramblerConfig::from_toml_str("[names\nlength = ");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = ScramblerConfig::load(Some(Path::new("/non/existent/config.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_hidden_and_reserved_excluded() {
        let compiled = CompiledExclusions::default();

        assert!(compiled.is_excluded(".DS_Store"));
        assert!(compiled.is_excluded("script.py"));
        assert!(compiled.is_excluded("script.pyc"));
        assert!(compiled.is_excluded("log.log"));
        assert!(!compiled.is_excluded("file1.txt"));
        assert!(!compiled.is_excluded("README"));
    }

    #[test]
    fn test_log_always_reserved() {
        let config = ScramblerConfig::from_toml_str(
            r#"
            [filters]
            reserved_extensions = [".bak"]
            "#,
        )
        .unwrap();
        let compiled = config.compile_exclusions().unwrap();

        assert!(compiled.is_excluded("old.bak"));
        assert!(compiled.is_excluded("photos_scramble.log"));
        assert!(!compiled.is_excluded("script.py"));
    }

    #[test]
    fn test_exclude_filenames_and_patterns() {
        let config = ScramblerConfig::from_toml_str(
            r#"
            [filters.exclude]
            filenames = ["Thumbs.db"]
            patterns = ["*.tmp", "draft_*"]
            "#,
        )
        .unwrap();
        let compiled = config.compile_exclusions().unwrap();

        assert!(compiled.is_excluded("Thumbs.db"));
        assert!(compiled.is_excluded("cache.tmp"));
        assert!(compiled.is_excluded("draft_essay.txt"));
        assert!(!compiled.is_excluded("essay.txt"));
    }

    #[test]
    fn test_invalid_glob_pattern_returns_error() {
        let config = ScramblerConfig::from_toml_str(
            r#"
            [filters.exclude]
            patterns = ["[invalid"]
            "#,
        )
        .unwrap();

        let result = config.compile_exclusions();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidGlobPattern { .. })
        ));
    }
}
