use regex::Regex;

use crate::config::SemverConfig;
use crate::error::{GitSemverError, Result};

/// Compiled engine settings.
///
/// Classification patterns are compiled exactly once here and injected into
/// the resolution engine; the engine itself never builds regexes from
/// configuration. All fields are read-only for the duration of a run.
#[derive(Debug)]
pub struct Settings {
    /// Matches commit messages that mark a release (e.g. "release: 1.2.3")
    pub release_regex: Regex,
    /// Matches commits that require a major bump
    pub major_regex: Regex,
    /// Matches commits that require a minor bump
    pub minor_regex: Regex,
    /// Matches commits that require a patch bump
    pub patch_regex: Regex,
    /// Label stamped onto unreleased versions
    pub default_pre_release: String,
    /// Collapse multiple qualifying commits into a single increment
    pub group_version_increments: bool,
    /// Suppress the forced bump when dirty or ahead with no qualifying commits
    pub no_auto_bump: bool,
}

impl Settings {
    /// Compile settings from a raw configuration.
    ///
    /// # Returns
    /// * `Ok(Settings)` - All four patterns compiled
    /// * `Err` - If any pattern is not a valid regex
    pub fn from_config(config: &SemverConfig) -> Result<Self> {
        Ok(Settings {
            release_regex: compile("release_pattern", &config.release_pattern)?,
            major_regex: compile("major_pattern", &config.major_pattern)?,
            minor_regex: compile("minor_pattern", &config.minor_pattern)?,
            patch_regex: compile("patch_pattern", &config.patch_pattern)?,
            default_pre_release: config.default_pre_release.clone(),
            group_version_increments: config.group_version_increments,
            no_auto_bump: config.no_auto_bump,
        })
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| GitSemverError::pattern(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_defaults() {
        let settings = Settings::from_config(&SemverConfig::default()).unwrap();

        assert!(settings.release_regex.is_match("release: 2.0.0"));
        assert!(settings.release_regex.is_match("release(api): 2.0.0"));
        assert!(!settings.release_regex.is_match("chore: prepare release"));

        assert!(settings.major_regex.is_match("feat(api)!: drop v1 endpoints"));
        assert!(settings.major_regex.is_match("refactor!: rewrite"));
        assert!(settings
            .major_regex
            .is_match("fix: rename\n\nBREAKING CHANGE: field renamed"));
        assert!(!settings.major_regex.is_match("feat: additive change"));

        assert!(settings.minor_regex.is_match("feat: new search"));
        assert!(settings.minor_regex.is_match("feat(auth): oauth"));
        assert!(!settings.minor_regex.is_match("fix: typo"));

        assert!(settings.patch_regex.is_match("fix(ui): button color"));
        assert!(!settings.patch_regex.is_match("docs: update readme"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let config = SemverConfig {
            major_pattern: "(unclosed".to_string(),
            ..SemverConfig::default()
        };
        let err = Settings::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("major_pattern"));
    }
}
