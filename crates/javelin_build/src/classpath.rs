//! Ordered classpath handling.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ClasspathError;

/// An ordered list of class directories and jar files.
///
/// Entries are kept as paths and only joined into a single string at the
/// process boundary, using the separator of the platform the build runs on
/// (`:` on Unix, `;` on Windows).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    /// Creates a classpath from entries in lookup order.
    pub fn new(entries: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the entries in lookup order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy with `path` looked up before every existing entry.
    pub fn with_leading(&self, path: &Path) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(path.to_path_buf());
        entries.extend(self.entries.iter().cloned());
        Self { entries }
    }

    /// Returns a copy with `path` looked up after every existing entry.
    pub fn with_trailing(&self, path: &Path) -> Self {
        let mut entries = self.entries.clone();
        entries.push(path.to_path_buf());
        Self { entries }
    }

    /// Joins the entries with the platform path list separator.
    pub fn join(&self) -> Result<OsString, ClasspathError> {
        std::env::join_paths(&self.entries).map_err(|_| {
            let entry = self
                .entries
                .iter()
                .find(|e| std::env::join_paths([e]).is_err())
                .cloned()
                .unwrap_or_default();
            ClasspathError::InvalidEntry { entry }
        })
    }
}
