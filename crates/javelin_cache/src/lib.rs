//! Incremental compilation cache.
//!
//! This crate persists the fingerprint each source file had at its last
//! successful compile, and classifies files as stale or unchanged against
//! that record. Every read is fail-safe: anything that cannot be trusted is
//! reported as a cache miss, which forces a rebuild.

#![warn(missing_docs)]

pub mod detector;
pub mod error;
pub mod store;

pub use detector::{ChangeDetector, ChangeSet, Staleness};
pub use error::CacheError;
pub use store::FingerprintStore;
