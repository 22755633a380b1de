use std::collections::HashMap;
use std::path::Path;

use git2::{Oid, Repository, StatusOptions};

use crate::domain::{Commit, Tag};
use crate::error::Result;
use crate::git::GitProvider;

/// Wrapper around git2::Repository with our provider interface
pub struct Git2Provider {
    repo: Repository,
}

impl Git2Provider {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;

        Ok(Git2Provider { repo })
    }

    /// Create from an existing git2::Repository
    pub fn from_git2(repo: Repository) -> Self {
        Git2Provider { repo }
    }

    fn commit_from_oid(&self, oid: Oid) -> Result<Commit> {
        let commit = self.repo.find_commit(oid)?;
        Ok(Commit::new(
            oid.to_string(),
            commit.message().unwrap_or("").to_string(),
            commit.time().seconds(),
        ))
    }
}

impl GitProvider for Git2Provider {
    fn head_commit(&self) -> Result<Commit> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.commit_from_oid(head.id())
    }

    fn parents(&self, commit: &Commit) -> Box<dyn Iterator<Item = Commit> + '_> {
        // Parent ids come from the commit header; the per-parent lookup is
        // deferred until the iterator is advanced.
        let parent_ids: Vec<Oid> = Oid::from_str(&commit.sha)
            .and_then(|oid| self.repo.find_commit(oid))
            .map(|c| c.parent_ids().collect())
            .unwrap_or_default();

        Box::new(parent_ids.into_iter().filter_map(move |oid| {
            match self.commit_from_oid(oid) {
                Ok(parent) => Some(parent),
                Err(e) => {
                    tracing::warn!(oid = %oid, error = %e, "skipping unreadable parent commit");
                    None
                }
            }
        }))
    }

    fn tags_by_sha(&self) -> Result<HashMap<String, Vec<Tag>>> {
        let names = self.repo.tag_names(None)?;
        let mut tags: HashMap<String, Vec<Tag>> = HashMap::new();

        for name in names.iter().flatten() {
            let reference_name = format!("refs/tags/{}", name);
            let reference = match self.repo.find_reference(&reference_name) {
                Ok(reference) => reference,
                Err(_) => continue,
            };
            // Peel through annotated tag objects to the commit they mark
            let target = match reference.peel_to_commit() {
                Ok(commit) => commit.id().to_string(),
                Err(_) => continue,
            };
            tags.entry(target.clone())
                .or_default()
                .push(Tag::new(name, target));
        }

        Ok(tags)
    }

    fn is_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.is_empty())
    }
}

// SAFETY: Git2Provider wraps git2::Repository which is Send. The provider
// only performs read operations, which libgit2 handles thread-safely.
unsafe impl Sync for Git2Provider {}
