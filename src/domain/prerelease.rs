//! Pre-release identifier handling for semantic versioning
//!
//! A pre-release identifier is a textual prefix with an optional trailing
//! iteration number, e.g. "alpha", "rc.2", "SNAPSHOT" or a bare "5".

use std::fmt;

/// Pre-release part of a semantic version.
///
/// # Examples
/// - "alpha" -> PreRelease { prefix: "alpha", number: None }
/// - "rc.2"  -> PreRelease { prefix: "rc.", number: Some(2) }
/// - "5"     -> PreRelease { prefix: "", number: Some(5) }
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PreRelease {
    /// Textual prefix, kept verbatim including any separator characters
    pub prefix: String,
    /// Optional trailing iteration number
    pub number: Option<u32>,
}

impl PreRelease {
    /// Create a new pre-release identifier
    pub fn new(prefix: impl Into<String>, number: Option<u32>) -> Self {
        PreRelease {
            prefix: prefix.into(),
            number,
        }
    }

    /// An empty identifier, meaning "not a pre-release"
    pub fn none() -> Self {
        PreRelease::default()
    }

    /// Parse a pre-release identifier from a string.
    ///
    /// Splits a trailing run of ASCII digits off the text; everything before
    /// it becomes the prefix. Any string parses, there is no error case.
    /// A numeric run too large for u32 leaves the whole text as prefix so
    /// no characters are dropped.
    pub fn parse(text: &str) -> Self {
        let digits = text
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let (prefix, suffix) = text.split_at(text.len() - digits);

        match suffix.parse::<u32>() {
            Ok(number) => PreRelease::new(prefix, Some(number)),
            Err(_) => PreRelease::new(text, None),
        }
    }

    /// True if this identifier marks the version as a pre-release
    pub fn is_pre_release(&self) -> bool {
        !self.prefix.is_empty() || self.number.is_some()
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix)?;
        if let Some(number) = self.number {
            write!(f, "{}", number)?;
        }
        Ok(())
    }
}
