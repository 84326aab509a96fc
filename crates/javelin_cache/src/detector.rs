//! Change detection against the fingerprint store.
//!
//! Staleness is decided purely from content: a file is unchanged only when
//! its current fingerprint equals the one recorded at its last successful
//! compile. Timestamps play no part.

use std::collections::HashSet;

use javelin_common::{Fingerprint, SourceId};
use serde::Serialize;

use crate::error::CacheError;
use crate::store::FingerprintStore;

/// Classification of a single source file against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Staleness {
    /// The recorded fingerprint matches the current content.
    Unchanged,
    /// No usable record exists for the file.
    New,
    /// A record exists but its fingerprint differs from the current content.
    Modified,
    /// The current content could not be read, so it cannot be confirmed unchanged.
    Unreadable,
}

impl Staleness {
    /// Returns `true` if the file must be recompiled.
    pub fn is_stale(self) -> bool {
        self != Staleness::Unchanged
    }
}

/// Result of classifying a whole source tree.
///
/// Every list is sorted by identity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSet {
    /// Files with no record in the store.
    pub new_files: Vec<SourceId>,

    /// Files whose content differs from the recorded fingerprint.
    pub modified_files: Vec<SourceId>,

    /// Files whose content could not be read.
    pub unreadable_files: Vec<SourceId>,

    /// Files whose content matches the recorded fingerprint.
    pub unchanged_files: Vec<SourceId>,

    /// Records in the store with no corresponding source file.
    pub deleted_files: Vec<SourceId>,
}

impl ChangeSet {
    /// Returns `true` if nothing needs recompiling and no records are orphaned.
    pub fn is_empty(&self) -> bool {
        self.stale_count() == 0 && self.deleted_files.is_empty()
    }

    /// Returns the number of files that a build pass would compile.
    pub fn stale_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len() + self.unreadable_files.len()
    }
}

/// Read-only view over a [`FingerprintStore`] that decides staleness.
pub struct ChangeDetector<'a> {
    store: &'a FingerprintStore,
}

impl<'a> ChangeDetector<'a> {
    /// Creates a detector over the given store.
    pub fn new(store: &'a FingerprintStore) -> Self {
        Self { store }
    }

    /// Classifies a file given its current fingerprint, or `None` if its
    /// content could not be read.
    pub fn classify(&self, id: &SourceId, current: Option<&Fingerprint>) -> Staleness {
        let Some(current) = current else {
            return Staleness::Unreadable;
        };
        match self.store.get(id) {
            Some(recorded) if recorded == *current => Staleness::Unchanged,
            Some(_) => Staleness::Modified,
            None => Staleness::New,
        }
    }

    /// Returns `true` if the file must be recompiled.
    pub fn is_stale(&self, id: &SourceId, current: Option<&Fingerprint>) -> bool {
        self.classify(id, current).is_stale()
    }

    /// Classifies every file in the current source set and lists records
    /// that no longer have a source file.
    pub fn detect_changes(
        &self,
        files: &[(SourceId, Option<Fingerprint>)],
    ) -> Result<ChangeSet, CacheError> {
        let mut changes = ChangeSet::default();

        for (id, current) in files {
            let bucket = match self.classify(id, current.as_ref()) {
                Staleness::Unchanged => &mut changes.unchanged_files,
                Staleness::New => &mut changes.new_files,
                Staleness::Modified => &mut changes.modified_files,
                Staleness::Unreadable => &mut changes.unreadable_files,
            };
            bucket.push(id.clone());
        }

        let live: HashSet<&SourceId> = files.iter().map(|(id, _)| id).collect();
        changes.deleted_files = self
            .store
            .entries()?
            .into_iter()
            .filter(|id| !live.contains(id))
            .collect();

        changes.new_files.sort();
        changes.modified_files.sort();
        changes.unreadable_files.sort();
        changes.unchanged_files.sort();

        Ok(changes)
    }
}
