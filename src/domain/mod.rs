//! Domain value types - pure data independent of git plumbing

pub mod commit;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use commit::Commit;
pub use prerelease::PreRelease;
pub use tag::Tag;
pub use version::{SemInfoVersion, SemVersion};
