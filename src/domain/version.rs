use std::cmp::Ordering;
use std::fmt;

use crate::domain::PreRelease;

/// Immutable semantic version value.
///
/// Renders as `major.minor.patch[-preRelease]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: PreRelease,
}

impl SemVersion {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32, pre_release: PreRelease) -> Self {
        SemVersion {
            major,
            minor,
            patch,
            pre_release,
        }
    }

    /// True if this version carries a pre-release identifier
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_pre_release()
    }
}

impl Ord for SemVersion {
    /// Orders by major, minor, patch; at an equal triple a release sorts
    /// above a pre-release, then pre-release identifiers compare among
    /// themselves.
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| {
                other
                    .is_pre_release()
                    .cmp(&self.is_pre_release())
            })
            .then_with(|| self.pre_release.cmp(&other.pre_release))
    }
}

impl PartialOrd for SemVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.is_pre_release() {
            write!(f, "-{}", self.pre_release)?;
        }
        Ok(())
    }
}

/// Resolved version for a commit, as produced by the resolution engine.
///
/// Carries the commit it was resolved for, the number of commits applied
/// since the last anchor, and the anchor version itself for the four-part
/// revision form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemInfoVersion {
    /// Sha of the commit this version was resolved for
    pub sha: String,
    /// The resolved version
    pub version: SemVersion,
    /// Commits applied since the last release anchor or pre-release checkpoint
    pub commit_count: u32,
    /// Version of the anchor the resolution started from
    pub previous_version: SemVersion,
}

impl SemInfoVersion {
    /// Short form: `1.3.0-SNAPSHOT`
    pub fn to_version_string(&self) -> String {
        self.version.to_string()
    }

    /// Long form with build metadata: `1.3.0-SNAPSHOT+003`, optionally
    /// followed by `.sha.<abbreviated sha>` when `sha_len` is non-zero.
    pub fn to_info_version_string(&self, sha_len: usize) -> String {
        let mut text = format!("{}+{:03}", self.version, self.commit_count);
        if sha_len > 0 && !self.sha.is_empty() {
            let end = sha_len.min(self.sha.len());
            text.push_str(&format!(".sha.{}", &self.sha[..end]));
        }
        text
    }

    /// Four-part revision form counting commits since the anchor:
    /// `anchor.major.anchor.minor.anchor.patch.commitCount`.
    pub fn to_revision_string(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.previous_version.major,
            self.previous_version.minor,
            self.previous_version.patch,
            self.commit_count
        )
    }
}
