//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while writing or maintaining the cache.
///
/// Reads never produce a `CacheError`: an unreadable or corrupt record is
/// reported as a miss. Only operations that change the cache on disk
/// (recording a fingerprint, pruning, clearing) can fail.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while writing or removing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
