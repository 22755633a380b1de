/// A git tag after de-referencing: its name and the sha of the commit it
/// points to. Multiple tags may point at the same commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub sha: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            sha: sha.into(),
        }
    }
}
