use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Commit, PreRelease, SemVersion};
use crate::settings::Settings;

/// SemVer-like pattern accepted from tag names and release markers:
/// `[v]major.minor[.patch[.revision]][-preRelease][+metadata]`.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\b)[vV]?(\d+)\.(\d+)(?:\.(\d+)(?:\.(\d+))?)?(?:-([0-9A-Za-z.-]+))?(?:\+[0-9A-Za-z.-]+)?",
    )
    .expect("hard-coded version pattern compiles")
});

/// Working version state for one branch lineage during history traversal.
///
/// Tracks the resolved version as of one commit: the anchor it started
/// from, the number of commits applied since, and the pending bump
/// counters accumulated from classified commit messages. The counters are
/// private to this module; they are resolved into the version fields by
/// [MutableSemVersion::apply_pending_changes] and cleared immediately
/// after, so they are never compared or rendered.
#[derive(Debug, Clone)]
pub struct MutableSemVersion {
    /// Sha of the most recently applied commit
    pub sha: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: PreRelease,
    /// Commits applied since the last anchor or checkpoint
    pub commit_count: u32,
    bump_major: u32,
    bump_minor: u32,
    bump_patch: u32,
    bump_pre: u32,
    /// Anchor version this lineage started from; frozen at creation
    initial: SemVersion,
}

impl MutableSemVersion {
    /// The zero version, used when a lineage reaches a root commit with no
    /// anchor anywhere in its history.
    pub fn new() -> Self {
        MutableSemVersion {
            sha: String::new(),
            major: 0,
            minor: 0,
            patch: 0,
            pre_release: PreRelease::none(),
            commit_count: 0,
            bump_major: 0,
            bump_minor: 0,
            bump_patch: 0,
            bump_pre: 0,
            initial: SemVersion::new(0, 0, 0, PreRelease::none()),
        }
    }

    /// Parse an accumulator from a tag name or release marker text.
    ///
    /// Matches anywhere in the text, so both `v1.2.3` and
    /// `release: 1.2.3-rc.1` route through here. The optional fourth
    /// numeric part initializes the commit count; build metadata is
    /// accepted and discarded. Returns `None` for anything that does not
    /// contain a version - malformed tags are ignored, never fatal.
    pub fn try_parse(text: &str) -> Option<Self> {
        let caps = VERSION_PATTERN.captures(text)?;

        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = match caps.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let commit_count = match caps.get(4) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let pre_release = caps
            .get(5)
            .map(|m| PreRelease::parse(m.as_str()))
            .unwrap_or_default();

        let mut version = MutableSemVersion::new();
        version.major = major;
        version.minor = minor;
        version.patch = patch;
        version.commit_count = commit_count;
        version.pre_release = pre_release.clone();
        version.initial = SemVersion::new(major, minor, patch, pre_release);
        Some(version)
    }

    /// True if the current state carries a pre-release identifier
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_pre_release()
    }

    /// Snapshot the current version fields as an immutable value
    pub fn to_sem_version(&self) -> SemVersion {
        SemVersion::new(
            self.major,
            self.minor,
            self.patch,
            self.pre_release.clone(),
        )
    }

    /// Replace the pre-release channel; an empty string clears it
    pub fn set_pre_release(&mut self, text: &str) {
        self.pre_release = PreRelease::parse(text);
    }

    /// Full accumulator order: version fields first, then commit count as
    /// the final tie-break so the lineage with more commits since its
    /// anchor is considered ahead.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        self.to_sem_version()
            .cmp(&other.to_sem_version())
            .then_with(|| self.commit_count.cmp(&other.commit_count))
    }

    /// Apply one commit to this lineage.
    ///
    /// A `checkpoint` is a version parsed from a pre-release tag pointing
    /// at this exact commit. A checkpoint at least as high as the current
    /// state is adopted wholesale - it is an authoritative marker, so the
    /// version fields are copied in, the commit count restarts and pending
    /// bumps are dropped. A lower checkpoint is ignored; the version never
    /// regresses.
    ///
    /// Otherwise the commit is counted and classified major/minor/patch by
    /// the settings patterns, first match wins. While a pre-release channel
    /// is active, a major or minor match only counts if the channel is
    /// still on the anchor's major (and minor) line, and a patch match
    /// advances the pre-release counter instead of the patch number
    /// whenever the channel carries a numeric suffix.
    pub fn update_from_commit(
        &mut self,
        commit: &Commit,
        settings: &Settings,
        checkpoint: Option<&MutableSemVersion>,
    ) {
        self.sha = commit.sha.clone();

        if let Some(checkpoint) = checkpoint {
            if checkpoint.compare_to(self) != Ordering::Less {
                self.major = checkpoint.major;
                self.minor = checkpoint.minor;
                self.patch = checkpoint.patch;
                self.pre_release = checkpoint.pre_release.clone();
                self.commit_count = 0;
                self.clear_pending();
                return;
            }
            tracing::warn!(
                sha = %commit.short_sha(),
                current = %self.to_sem_version(),
                tagged = %checkpoint.to_sem_version(),
                "ignoring pre-release tag lower than the current version"
            );
        }

        self.commit_count += 1;

        if settings.major_regex.is_match(&commit.text) {
            if !self.is_pre_release() || self.major == self.initial.major {
                self.bump_major += 1;
            }
        } else if settings.minor_regex.is_match(&commit.text) {
            if !self.is_pre_release()
                || (self.major == self.initial.major && self.minor == self.initial.minor)
            {
                self.bump_minor += 1;
            }
        } else if settings.patch_regex.is_match(&commit.text) {
            if self.pre_release.number.is_some() {
                self.bump_pre += 1;
            } else {
                self.bump_patch += 1;
            }
        }
    }

    /// Fold sibling lineages into this one at a merge commit.
    ///
    /// The merged state keeps this accumulator's version fields (the caller
    /// picks the highest parent as the base) but carries the combined
    /// commit count and pending bump magnitudes of every merged lineage.
    pub fn merge_changes(&mut self, others: &[MutableSemVersion]) {
        for other in others {
            self.commit_count += other.commit_count;
            self.bump_major += other.bump_major;
            self.bump_minor += other.bump_minor;
            self.bump_patch += other.bump_patch;
            self.bump_pre += other.bump_pre;
        }
    }

    /// Resolve the pending bump counters into the version fields.
    ///
    /// Only the highest-priority non-zero counter applies (major > minor >
    /// patch > pre): grouped mode increments by one, ungrouped mode by the
    /// counter's full accumulated magnitude. With nothing pending and
    /// `force_bump_if_no_change` set, the pre-release number advances if
    /// one exists, else the patch number. Returns whether anything changed;
    /// pending counters are always cleared on the pending path.
    pub fn apply_pending_changes(
        &mut self,
        force_bump_if_no_change: bool,
        group_changes: bool,
    ) -> bool {
        if self.has_pending_changes() {
            let (major, minor, patch, pre) = if group_changes {
                (1, 1, 1, 1)
            } else {
                (self.bump_major, self.bump_minor, self.bump_patch, self.bump_pre)
            };

            if self.bump_major > 0 {
                self.update_major(major);
            } else if self.bump_minor > 0 {
                self.update_minor(minor);
            } else if self.bump_patch > 0 {
                self.update_patch(patch);
            } else {
                self.update_pre(pre);
            }
            self.clear_pending();
            return true;
        }

        if force_bump_if_no_change {
            if self.pre_release.number.is_some() {
                self.update_pre(1);
            } else {
                self.update_patch(1);
            }
            return true;
        }

        false
    }

    fn has_pending_changes(&self) -> bool {
        self.bump_major + self.bump_minor + self.bump_patch + self.bump_pre > 0
    }

    fn clear_pending(&mut self) {
        self.bump_major = 0;
        self.bump_minor = 0;
        self.bump_patch = 0;
        self.bump_pre = 0;
    }

    fn update_major(&mut self, by: u32) {
        self.major += by;
        self.minor = 0;
        self.patch = 0;
        self.restart_pre_release_number();
    }

    fn update_minor(&mut self, by: u32) {
        self.minor += by;
        self.patch = 0;
        self.restart_pre_release_number();
    }

    fn update_patch(&mut self, by: u32) {
        self.patch += by;
        self.restart_pre_release_number();
    }

    fn update_pre(&mut self, by: u32) {
        self.pre_release.number = Some(self.pre_release.number.unwrap_or(0) + by);
    }

    fn restart_pre_release_number(&mut self) {
        if self.pre_release.number.is_some() {
            self.pre_release.number = Some(1);
        }
    }
}

impl Default for MutableSemVersion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SemverConfig;

    fn settings() -> Settings {
        Settings::from_config(&SemverConfig::default()).unwrap()
    }

    fn commit(text: &str) -> Commit {
        Commit::new("abcdef1234567890", text, 1)
    }

    // try_parse

    #[test]
    fn test_try_parse_full() {
        let v = MutableSemVersion::try_parse("v1.2.3").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
        assert!(!v.is_pre_release());
    }

    #[test]
    fn test_try_parse_two_part() {
        let v = MutableSemVersion::try_parse("v1.2").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 0));
    }

    #[test]
    fn test_try_parse_four_part_sets_commit_count() {
        let v = MutableSemVersion::try_parse("1.2.3.45").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
        assert_eq!(v.commit_count, 45);
    }

    #[test]
    fn test_try_parse_pre_release() {
        let v = MutableSemVersion::try_parse("v2.0.0-rc.1").unwrap();
        assert!(v.is_pre_release());
        assert_eq!(v.pre_release.prefix, "rc.");
        assert_eq!(v.pre_release.number, Some(1));
    }

    #[test]
    fn test_try_parse_ignores_metadata() {
        let v = MutableSemVersion::try_parse("1.2.3+build.99").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
        assert!(!v.is_pre_release());
    }

    #[test]
    fn test_try_parse_inside_marker_text() {
        let v = MutableSemVersion::try_parse("release: 2.0.0\n\ncut by CI").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (2, 0, 0));
    }

    #[test]
    fn test_try_parse_rejects_non_versions() {
        assert!(MutableSemVersion::try_parse("no version here").is_none());
        assert!(MutableSemVersion::try_parse("stable").is_none());
        // numeric overflow is a parse failure, not a panic
        assert!(MutableSemVersion::try_parse("99999999999.0.0").is_none());
    }

    // update_from_commit classification

    #[test]
    fn test_update_counts_and_classifies() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("1.0.0").unwrap();

        v.update_from_commit(&commit("fix: x"), &s, None);
        v.update_from_commit(&commit("feat: y"), &s, None);
        v.update_from_commit(&commit("chore: z"), &s, None);

        assert_eq!(v.commit_count, 3);
        assert!(v.apply_pending_changes(false, true));
        assert_eq!((v.major, v.minor, v.patch), (1, 1, 0));
    }

    #[test]
    fn test_major_beats_minor_and_patch() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("1.0.0").unwrap();

        v.update_from_commit(&commit("fix: rename\n\nBREAKING CHANGE: field"), &s, None);

        assert!(v.apply_pending_changes(false, true));
        assert_eq!((v.major, v.minor, v.patch), (2, 0, 0));
    }

    #[test]
    fn test_update_sets_sha() {
        let s = settings();
        let mut v = MutableSemVersion::new();
        v.update_from_commit(&commit("chore: z"), &s, None);
        assert_eq!(v.sha, "abcdef1234567890");
    }

    #[test]
    fn test_patch_advances_pre_counter_inside_numbered_channel() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("1.1.0-rc.1").unwrap();

        v.update_from_commit(&commit("fix: y"), &s, None);

        assert!(v.apply_pending_changes(false, true));
        assert_eq!(v.to_sem_version().to_string(), "1.1.0-rc.2");
    }

    #[test]
    fn test_minor_suppressed_off_the_anchor_line() {
        let s = settings();
        // lineage anchored at 1.0.0, then a pre-release tag for the next
        // minor is adopted; further feature commits must not escape the
        // channel
        let mut v = MutableSemVersion::try_parse("1.0.0").unwrap();
        let checkpoint = MutableSemVersion::try_parse("1.1.0-beta.1").unwrap();
        v.update_from_commit(&commit("chore: tag rc"), &s, Some(&checkpoint));

        v.update_from_commit(&commit("feat: more"), &s, None);
        // the feature was suppressed entirely; only the forced path could
        // move the version now
        assert!(!v.apply_pending_changes(false, true));
        assert_eq!(v.to_sem_version().to_string(), "1.1.0-beta.1");
    }

    // checkpoints

    #[test]
    fn test_checkpoint_adopted_wholesale() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("1.0.0").unwrap();
        v.update_from_commit(&commit("feat: x"), &s, None);
        assert_eq!(v.commit_count, 1);

        let checkpoint = MutableSemVersion::try_parse("1.1.0-rc.1").unwrap();
        v.update_from_commit(&commit("chore: tag"), &s, Some(&checkpoint));

        assert_eq!(v.to_sem_version().to_string(), "1.1.0-rc.1");
        assert_eq!(v.commit_count, 0);
        // pending minor from the feature commit was dropped with the adoption
        assert!(!v.apply_pending_changes(false, true));
    }

    #[test]
    fn test_checkpoint_never_regresses() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("2.0.0").unwrap();

        let stale = MutableSemVersion::try_parse("1.0.0-rc.1").unwrap();
        v.update_from_commit(&commit("chore: old tag"), &s, Some(&stale));

        assert_eq!(v.to_sem_version().to_string(), "2.0.0");
        // the commit still counts on the normal path
        assert_eq!(v.commit_count, 1);
    }

    // apply_pending_changes

    #[test]
    fn test_grouped_collapses_magnitude() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("1.2.0").unwrap();
        v.update_from_commit(&commit("fix: a"), &s, None);
        v.update_from_commit(&commit("fix: b"), &s, None);

        assert!(v.apply_pending_changes(false, true));
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 1));
    }

    #[test]
    fn test_ungrouped_applies_magnitude() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("1.2.0").unwrap();
        v.update_from_commit(&commit("fix: a"), &s, None);
        v.update_from_commit(&commit("fix: b"), &s, None);

        assert!(v.apply_pending_changes(false, false));
        assert_eq!((v.major, v.minor, v.patch), (1, 2, 2));
    }

    #[test]
    fn test_higher_priority_discards_lower_magnitudes() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("1.2.0").unwrap();
        v.update_from_commit(&commit("fix: a"), &s, None);
        v.update_from_commit(&commit("fix: b"), &s, None);
        v.update_from_commit(&commit("feat: c"), &s, None);

        assert!(v.apply_pending_changes(false, false));
        // the feature outranks the fixes; their magnitude does not leak
        // into the patch number
        assert_eq!((v.major, v.minor, v.patch), (1, 3, 0));
    }

    #[test]
    fn test_bump_resets_pre_release_number() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("2.0.0-beta.4").unwrap();
        // on the anchor line, so the major still counts
        v.update_from_commit(&commit("refactor!: drop api"), &s, None);

        assert!(v.apply_pending_changes(false, true));
        assert_eq!(v.to_sem_version().to_string(), "3.0.0-beta.1");
    }

    #[test]
    fn test_force_bump_without_changes_bumps_patch() {
        let mut v = MutableSemVersion::try_parse("1.0.0").unwrap();
        assert!(v.apply_pending_changes(true, true));
        assert_eq!((v.major, v.minor, v.patch), (1, 0, 1));
    }

    #[test]
    fn test_force_bump_advances_pre_release_number() {
        let mut v = MutableSemVersion::try_parse("1.0.0-rc.2").unwrap();
        assert!(v.apply_pending_changes(true, true));
        assert_eq!(v.to_sem_version().to_string(), "1.0.0-rc.3");
    }

    #[test]
    fn test_no_changes_and_no_force_is_a_no_op() {
        let mut v = MutableSemVersion::try_parse("1.0.0").unwrap();
        assert!(!v.apply_pending_changes(false, true));
        assert_eq!(v.to_sem_version().to_string(), "1.0.0");
    }

    #[test]
    fn test_counters_cleared_after_apply() {
        let s = settings();
        let mut v = MutableSemVersion::try_parse("1.0.0").unwrap();
        v.update_from_commit(&commit("feat: x"), &s, None);

        assert!(v.apply_pending_changes(false, true));
        assert!(!v.apply_pending_changes(false, true));
        assert_eq!((v.major, v.minor, v.patch), (1, 1, 0));
    }

    // merge_changes

    #[test]
    fn test_merge_sums_counts_and_counters() {
        let s = settings();
        let mut left = MutableSemVersion::try_parse("1.0.0").unwrap();
        left.update_from_commit(&commit("fix: a"), &s, None);
        left.update_from_commit(&commit("fix: b"), &s, None);

        let mut right = MutableSemVersion::new();
        right.update_from_commit(&commit("feat: c"), &s, None);

        left.merge_changes(&[right]);
        assert_eq!(left.commit_count, 3);

        assert!(left.apply_pending_changes(false, false));
        assert_eq!((left.major, left.minor, left.patch), (1, 1, 0));
    }

    // ordering

    #[test]
    fn test_compare_commit_count_breaks_ties() {
        let s = settings();
        let mut ahead = MutableSemVersion::try_parse("1.0.0").unwrap();
        ahead.update_from_commit(&commit("chore: x"), &s, None);
        let behind = MutableSemVersion::try_parse("1.0.0").unwrap();

        assert_eq!(ahead.compare_to(&behind), Ordering::Greater);
    }

    #[test]
    fn test_compare_release_above_pre_release() {
        let release = MutableSemVersion::try_parse("1.0.0").unwrap();
        let pre = MutableSemVersion::try_parse("1.0.0-rc.9").unwrap();
        assert_eq!(release.compare_to(&pre), Ordering::Greater);
    }

    // round trip

    #[test]
    fn test_version_string_round_trips() {
        for text in ["1.2.3", "0.1.0", "1.3.0-SNAPSHOT", "2.0.0-rc.2"] {
            let v = MutableSemVersion::try_parse(text).unwrap();
            let reparsed = MutableSemVersion::try_parse(&v.to_sem_version().to_string()).unwrap();
            assert_eq!((v.major, v.minor, v.patch), (reparsed.major, reparsed.minor, reparsed.patch));
            assert_eq!(v.pre_release.prefix, reparsed.pre_release.prefix);
        }
    }
}
