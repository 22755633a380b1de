use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{GitSemverError, Result};

/// Returns the default pattern matching `release:` commit markers.
fn default_release_pattern() -> String {
    r"^release(?:\([^)]+\))?:".to_string()
}

/// Returns the default pattern matching breaking changes.
fn default_major_pattern() -> String {
    r"^\w+(?:\([^)]+\))?!:|(?m)^BREAKING[ -]CHANGE:".to_string()
}

/// Returns the default pattern matching feature commits.
fn default_minor_pattern() -> String {
    r"^feat(?:\([^)]+\))?:".to_string()
}

/// Returns the default pattern matching fix commits.
fn default_patch_pattern() -> String {
    r"^fix(?:\([^)]+\))?:".to_string()
}

fn default_pre_release() -> String {
    "SNAPSHOT".to_string()
}

fn default_group_version_increments() -> bool {
    true
}

/// Raw configuration for git-semver, loaded from `gitsemver.toml`.
///
/// All fields are optional in the file; each falls back to the conventional
/// commits defaults. Patterns are plain strings here and compiled once into
/// [crate::settings::Settings] before the engine runs.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SemverConfig {
    #[serde(default = "default_release_pattern")]
    pub release_pattern: String,

    #[serde(default = "default_major_pattern")]
    pub major_pattern: String,

    #[serde(default = "default_minor_pattern")]
    pub minor_pattern: String,

    #[serde(default = "default_patch_pattern")]
    pub patch_pattern: String,

    /// Label stamped onto unreleased versions (e.g. "SNAPSHOT")
    #[serde(default = "default_pre_release")]
    pub default_pre_release: String,

    /// Collapse multiple qualifying commits into a single increment
    #[serde(default = "default_group_version_increments")]
    pub group_version_increments: bool,

    /// Suppress the forced bump when dirty or ahead with no qualifying commits
    #[serde(default)]
    pub no_auto_bump: bool,
}

impl Default for SemverConfig {
    fn default() -> Self {
        SemverConfig {
            release_pattern: default_release_pattern(),
            major_pattern: default_major_pattern(),
            minor_pattern: default_minor_pattern(),
            patch_pattern: default_patch_pattern(),
            default_pre_release: default_pre_release(),
            group_version_increments: default_group_version_increments(),
            no_auto_bump: false,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitsemver.toml` in current directory
/// 3. `.gitsemver.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(SemverConfig)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<SemverConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./gitsemver.toml").exists() {
        fs::read_to_string("./gitsemver.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".gitsemver.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(SemverConfig::default());
        }
    } else {
        return Ok(SemverConfig::default());
    };

    toml::from_str(&config_str).map_err(|e| GitSemverError::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let config = SemverConfig::default();
        assert!(config.release_pattern.starts_with("^release"));
        assert_eq!(config.default_pre_release, "SNAPSHOT");
        assert!(config.group_version_increments);
        assert!(!config.no_auto_bump);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: SemverConfig = toml::from_str("no_auto_bump = true").unwrap();
        assert!(config.no_auto_bump);
        assert_eq!(config.minor_pattern, default_minor_pattern());
    }
}
