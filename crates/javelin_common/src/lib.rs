//! Shared foundational types used across the Javelin build driver.
//!
//! This crate provides the content fingerprint used for change detection and
//! the path-based identity of a source file within its source root.

#![warn(missing_docs)]

pub mod hash;
pub mod source_id;

pub use hash::{Fingerprint, ParseFingerprintError};
pub use source_id::{SourceId, SourceIdError};
