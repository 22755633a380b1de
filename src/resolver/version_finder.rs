use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::domain::{Commit, SemInfoVersion, Tag};
use crate::error::Result;
use crate::git::GitProvider;
use crate::settings::Settings;

use super::accumulator::MutableSemVersion;

/// Resolves versions from the commit history graph.
///
/// The walk is iterative: histories can be arbitrarily deep, so parent
/// chains are never recursed. Phase one discovers commits
/// most-recent-first through a priority queue until every open lineage has
/// terminated at a release anchor, a root, or an already-seen lineage. Phase two
/// replays the discovered commits oldest-first, folding parent states at
/// merges and consuming each lineage state exactly once.
pub struct VersionFinder<'a, P: GitProvider> {
    settings: &'a Settings,
    provider: &'a P,
    tags: HashMap<String, Vec<Tag>>,
}

/// Queue entry for the discovery phase, ordered by commit timestamp so the
/// most recent commit pops first. The ordering is a performance heuristic,
/// not a correctness requirement; prune markers win ties so a release
/// boundary cuts history before the same commit is visited normally.
struct Visit {
    commit: Commit,
    prune: bool,
}

impl Visit {
    fn process(commit: Commit) -> Self {
        Visit {
            commit,
            prune: false,
        }
    }

    fn prune(commit: Commit) -> Self {
        Visit {
            commit,
            prune: true,
        }
    }
}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.commit
            .commit_time
            .cmp(&other.commit.commit_time)
            .then_with(|| self.prune.cmp(&other.prune))
            .then_with(|| self.commit.sha.cmp(&other.commit.sha))
    }
}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Visit {}

/// One discovered commit waiting for the replay phase. Parent shas are
/// recorded during discovery so the provider's lazy parent sequence is
/// enumerated exactly once per commit.
struct Replay {
    commit: Commit,
    parent_shas: Vec<String>,
    checkpoint: Option<MutableSemVersion>,
}

struct WalkOutcome {
    version: MutableSemVersion,
    change_log: Vec<Commit>,
}

impl<'a, P: GitProvider> VersionFinder<'a, P> {
    /// Create a finder over a provider with its tags pre-grouped by sha
    pub fn new(settings: &'a Settings, provider: &'a P, tags: HashMap<String, Vec<Tag>>) -> Self {
        VersionFinder {
            settings,
            provider,
            tags,
        }
    }

    /// Resolve the current version for `head`.
    ///
    /// Applies the pending bumps accumulated since the last anchor; when
    /// the tree is dirty or commits exist since the anchor (and auto-bump
    /// is not disabled), a bump is forced even without qualifying commits.
    /// A bump that lands on a plain version is stamped with
    /// `default_pre_release` to mark it unreleased.
    pub fn get_version(
        &self,
        head: &Commit,
        is_clean: bool,
        default_pre_release: &str,
    ) -> Result<SemInfoVersion> {
        let outcome = self.walk_history(head, false)?;
        let mut version = outcome.version;
        let previous = version.to_sem_version();

        let modified = !is_clean || version.commit_count > 0;
        let force_bump = modified && !self.settings.no_auto_bump;
        let changed =
            version.apply_pending_changes(force_bump, self.settings.group_version_increments);
        if changed && !version.is_pre_release() {
            version.set_pre_release(default_pre_release);
        }

        Ok(SemInfoVersion {
            sha: version.sha.clone(),
            commit_count: version.commit_count,
            version: version.to_sem_version(),
            previous_version: previous,
        })
    }

    /// Resolve the version to cut a release at `head`.
    ///
    /// The commit count restarts at zero and a bump is always applied,
    /// unless an explicit empty pre-release asks to finalize the current
    /// state as-is. A non-empty `new_pre_release` replaces the channel
    /// before the bump.
    pub fn get_release_version(
        &self,
        head: &Commit,
        new_pre_release: Option<&str>,
    ) -> Result<SemInfoVersion> {
        let outcome = self.walk_history(head, false)?;
        let mut version = outcome.version;
        let previous = version.to_sem_version();

        version.commit_count = 0;
        let finalize = new_pre_release == Some("");
        if let Some(pre_release) = new_pre_release {
            version.set_pre_release(pre_release);
        }
        if !finalize {
            version.apply_pending_changes(true, self.settings.group_version_increments);
        }

        Ok(SemInfoVersion {
            sha: version.sha.clone(),
            commit_count: version.commit_count,
            version: version.to_sem_version(),
            previous_version: previous,
        })
    }

    /// The commits making up the change log for `head`: everything since
    /// the previous release anchors, merge commits excluded. When `head`
    /// itself is a release, the log covers that release's own span
    /// including the release commit.
    pub fn get_changelog(&self, head: &Commit) -> Result<Vec<Commit>> {
        let head_is_release = self.release_anchor(head).is_some();
        let outcome = self.walk_history(head, head_is_release)?;
        Ok(outcome.change_log)
    }

    /// Two-phase walk producing the accumulator for `head`.
    ///
    /// `force_head_normal` makes the walk ignore a release anchor on the
    /// head commit itself, so the span behind it is still discovered.
    fn walk_history(&self, head: &Commit, force_head_normal: bool) -> Result<WalkOutcome> {
        // Phase 1: discovery, most recent commits first.
        let mut visited: HashMap<String, Option<MutableSemVersion>> = HashMap::new();
        let mut enqueued: HashSet<String> = HashSet::new();
        let mut queue: BinaryHeap<Visit> = BinaryHeap::new();
        let mut replays: Vec<Replay> = Vec::new();
        let mut live_branches: i64 = 1;
        let mut head_pending = force_head_normal;

        enqueued.insert(head.sha.clone());
        queue.push(Visit::process(head.clone()));

        while live_branches > 0 {
            let Some(visit) = queue.pop() else {
                break;
            };
            let commit = visit.commit;
            if visited.contains_key(&commit.sha) {
                continue;
            }

            if visit.prune {
                // Behind a discovered release: remember the sha so the
                // commit is never processed, and keep cutting upward.
                visited.insert(commit.sha.clone(), None);
                for parent in self.provider.parents(&commit) {
                    if !visited.contains_key(&parent.sha) {
                        queue.push(Visit::prune(parent));
                    }
                }
                continue;
            }

            let anchor = if head_pending {
                head_pending = false;
                None
            } else {
                self.release_anchor(&commit)
            };

            if let Some(mut anchor) = anchor {
                // A release anchor terminates this lineage; history behind
                // it is pruned instead of processed.
                anchor.sha = commit.sha.clone();
                visited.insert(commit.sha.clone(), Some(anchor));
                live_branches -= 1;
                for parent in self.provider.parents(&commit) {
                    if !visited.contains_key(&parent.sha) {
                        queue.push(Visit::prune(parent));
                    }
                }
                continue;
            }

            visited.insert(commit.sha.clone(), None);
            let checkpoint = self.pre_release_checkpoint(&commit);

            let mut parent_shas = Vec::new();
            let mut new_visits: i64 = 0;
            for parent in self.provider.parents(&commit) {
                parent_shas.push(parent.sha.clone());
                if !visited.contains_key(&parent.sha) && enqueued.insert(parent.sha.clone()) {
                    new_visits += 1;
                    queue.push(Visit::process(parent));
                }
            }
            // A merge opens lineages, a root or a convergence with an
            // already-discovered lineage closes one.
            live_branches += new_visits - 1;

            replays.push(Replay {
                commit,
                parent_shas,
                checkpoint,
            });
        }

        // Phase 2: replay oldest-discovered-first. Parent states are
        // removed from the map as they are consumed, so shared ancestry
        // in a diamond is only ever counted through one path.
        let mut change_log = Vec::new();
        while let Some(replay) = replays.pop() {
            if replay.parent_shas.len() <= 1 {
                change_log.push(replay.commit.clone());
            }

            let mut parent_states: Vec<MutableSemVersion> = replay
                .parent_shas
                .iter()
                .filter_map(|sha| visited.remove(sha).flatten())
                .collect();

            let mut version = match max_index(&parent_states) {
                Some(index) => parent_states.swap_remove(index),
                None => MutableSemVersion::new(),
            };
            version.merge_changes(&parent_states);
            version.update_from_commit(&replay.commit, self.settings, replay.checkpoint.as_ref());
            visited.insert(replay.commit.sha.clone(), Some(version));
        }

        let version = visited
            .remove(&head.sha)
            .flatten()
            .unwrap_or_default();

        Ok(WalkOutcome {
            version,
            change_log,
        })
    }

    /// A release anchor is a commit whose message matches the release
    /// pattern and carries a parsable version, or a commit pointed at by a
    /// tag whose parsed version has no pre-release part. Malformed markers
    /// and tags are skipped, never fatal.
    fn release_anchor(&self, commit: &Commit) -> Option<MutableSemVersion> {
        if self.settings.release_regex.is_match(&commit.text) {
            match MutableSemVersion::try_parse(&commit.text) {
                Some(version) => return Some(version),
                None => {
                    tracing::debug!(
                        sha = %commit.short_sha(),
                        "release marker without a parsable version"
                    );
                }
            }
        }

        self.tags.get(&commit.sha).and_then(|tags| {
            tags.iter()
                .filter_map(|tag| MutableSemVersion::try_parse(&tag.name))
                .filter(|version| !version.is_pre_release())
                .max_by(|a, b| a.compare_to(b))
        })
    }

    /// The highest pre-release version among the tags on this commit, if
    /// any; fed to the accumulator as an authoritative checkpoint.
    fn pre_release_checkpoint(&self, commit: &Commit) -> Option<MutableSemVersion> {
        self.tags.get(&commit.sha).and_then(|tags| {
            tags.iter()
                .filter_map(|tag| MutableSemVersion::try_parse(&tag.name))
                .filter(|version| version.is_pre_release())
                .max_by(|a, b| a.compare_to(b))
        })
    }
}

fn max_index(states: &[MutableSemVersion]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, state) in states.iter().enumerate() {
        match best {
            Some(current) if state.compare_to(&states[current]) != Ordering::Greater => {}
            _ => best = Some(index),
        }
    }
    best
}
