//! Source control abstraction layer
//!
//! This module provides a trait-based abstraction over the read-only git
//! operations the version resolution engine needs, allowing for multiple
//! implementations including real repositories and mocks for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [GitProvider] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Provider]: A real implementation using the `git2` crate
//! - [mock::MockProvider]: An in-memory implementation for testing
//!
//! Most code should depend on the [GitProvider] trait rather than concrete
//! implementations.

pub mod mock;
pub mod repository;

pub use mock::MockProvider;
pub use repository::Git2Provider;

use std::collections::HashMap;

use crate::domain::{Commit, Tag};
use crate::error::Result;

/// Read-only source control operations consumed by the resolution engine.
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` to allow safe sharing across
/// threads.
///
/// ## Error Handling
///
/// Methods return [crate::error::Result<T>]; implementations map underlying
/// errors (like `git2::Error`) to [crate::error::GitSemverError] variants.
/// Parent iteration is infallible at this seam: an implementation that
/// fails to materialize a parent skips it rather than aborting the walk.
pub trait GitProvider: Send + Sync {
    /// The commit HEAD currently points to
    fn head_commit(&self) -> Result<Commit>;

    /// Lazily iterate the parents of a commit, in parent order.
    ///
    /// The engine consumes each returned iterator at most once per
    /// discovery visit; implementations may defer per-parent lookups until
    /// the iterator is advanced.
    fn parents(&self, commit: &Commit) -> Box<dyn Iterator<Item = Commit> + '_>;

    /// All tags in the repository, grouped by the sha of the commit they
    /// point to. Annotated tags are peeled to their target commit.
    fn tags_by_sha(&self) -> Result<HashMap<String, Vec<Tag>>>;

    /// True if the working tree has no uncommitted changes
    fn is_clean(&self) -> Result<bool>;
}
