use std::collections::HashMap;

use crate::domain::{Commit, Tag};
use crate::error::{GitSemverError, Result};
use crate::git::GitProvider;

/// Mock provider for testing without actual git operations.
///
/// Holds an explicit commit DAG (commits plus parent edges) so tests can
/// model linear histories, merges and diamonds with controlled timestamps.
pub struct MockProvider {
    commits: HashMap<String, Commit>,
    parents: HashMap<String, Vec<String>>,
    tags: Vec<Tag>,
    head: Option<String>,
    clean: bool,
}

impl MockProvider {
    /// Create a new empty mock provider with a clean working tree
    pub fn new() -> Self {
        MockProvider {
            commits: HashMap::new(),
            parents: HashMap::new(),
            tags: Vec::new(),
            head: None,
            clean: true,
        }
    }

    /// Add a commit with its parent edges. The most recently added commit
    /// becomes HEAD.
    pub fn add_commit(
        &mut self,
        sha: impl Into<String>,
        text: impl Into<String>,
        commit_time: i64,
        parents: &[&str],
    ) {
        let sha = sha.into();
        self.commits
            .insert(sha.clone(), Commit::new(sha.clone(), text, commit_time));
        self.parents.insert(
            sha.clone(),
            parents.iter().map(|p| p.to_string()).collect(),
        );
        self.head = Some(sha);
    }

    /// Add a tag pointing at a sha
    pub fn add_tag(&mut self, name: impl Into<String>, sha: impl Into<String>) {
        self.tags.push(Tag::new(name, sha));
    }

    /// Move HEAD to an existing commit
    pub fn set_head(&mut self, sha: impl Into<String>) {
        self.head = Some(sha.into());
    }

    /// Mark the working tree dirty or clean
    pub fn set_clean(&mut self, clean: bool) {
        self.clean = clean;
    }

    /// Look up a commit by sha
    pub fn commit(&self, sha: &str) -> Option<&Commit> {
        self.commits.get(sha)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GitProvider for MockProvider {
    fn head_commit(&self) -> Result<Commit> {
        self.head
            .as_ref()
            .and_then(|sha| self.commits.get(sha))
            .cloned()
            .ok_or_else(|| GitSemverError::config("mock provider has no HEAD commit"))
    }

    fn parents(&self, commit: &Commit) -> Box<dyn Iterator<Item = Commit> + '_> {
        let shas = self.parents.get(&commit.sha).cloned().unwrap_or_default();
        Box::new(
            shas.into_iter()
                .filter_map(move |sha| self.commits.get(&sha).cloned()),
        )
    }

    fn tags_by_sha(&self) -> Result<HashMap<String, Vec<Tag>>> {
        let mut grouped: HashMap<String, Vec<Tag>> = HashMap::new();
        for tag in &self.tags {
            grouped.entry(tag.sha.clone()).or_default().push(tag.clone());
        }
        Ok(grouped)
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(self.clean)
    }
}
