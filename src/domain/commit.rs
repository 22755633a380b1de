/// A single commit in the history graph, as supplied by the source control
/// provider. Parent access is pulled lazily through the provider rather
/// than stored here, since real histories can be large.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full object id of the commit
    pub sha: String,
    /// Full message text (subject and body)
    pub text: String,
    /// Commit timestamp in seconds, used only for traversal ordering
    pub commit_time: i64,
}

impl Commit {
    /// Create a new commit node
    pub fn new(sha: impl Into<String>, text: impl Into<String>, commit_time: i64) -> Self {
        Commit {
            sha: sha.into(),
            text: text.into(),
            commit_time,
        }
    }

    /// Abbreviated sha for display (first 7 characters)
    pub fn short_sha(&self) -> &str {
        let end = self.sha.len().min(7);
        &self.sha[..end]
    }

    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }
}
