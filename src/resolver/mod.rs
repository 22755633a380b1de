//! Version resolution engine - history traversal and the per-lineage
//! version accumulator

pub mod accumulator;
pub mod version_finder;

pub use accumulator::MutableSemVersion;
pub use version_finder::VersionFinder;
