//! Durable per-file fingerprint records.
//!
//! The store mirrors the source tree's package structure under the cache
//! root: the record for `engine/gui/GameGUI.java` lives at
//! `<cache_root>/engine/gui/GameGUI.java.hash`. Two files that share a bare
//! name in different packages therefore never share a record. Each record is a
//! single line naming the format version and the hex digest.

use std::collections::HashSet;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use javelin_common::{Fingerprint, SourceId};

use crate::error::CacheError;

/// File extension of a fingerprint record.
const RECORD_EXT: &str = "hash";

/// Leading token of every record line.
const RECORD_MAGIC: &str = "javelin-fingerprint";

/// Record format version. Records with any other version are misses.
const RECORD_VERSION: &str = "v1";

/// Digest algorithm named in the record.
const RECORD_ALGORITHM: &str = "sha256";

/// Marker embedded in temporary file names during an atomic write.
const TEMP_MARKER: &str = ".tmp-";

/// Distinguishes temporary files written concurrently by one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Durable mapping from source identity to last-compiled fingerprint.
///
/// Reads are fail-safe: a missing, truncated, or otherwise unreadable record
/// is reported as absent. Writes go through a temporary sibling file that is
/// synced and renamed into place, so an interrupted write leaves either the
/// previous record or no record at all.
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    root: PathBuf,
}

impl FingerprintStore {
    /// Opens the store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn open(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the record path for a source identity.
    pub fn record_path(&self, id: &SourceId) -> PathBuf {
        let mut path = self.root.clone();
        for part in id.package() {
            path.push(part);
        }
        path.push(format!("{}.{RECORD_EXT}", id.file_name()));
        path
    }

    /// Looks up the fingerprint recorded for `id`.
    pub fn get(&self, id: &SourceId) -> Option<Fingerprint> {
        let path = self.record_path(id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::debug!(%id, path = %path.display(), error = %e, "cache record unreadable");
                }
                return None;
            }
        };
        let parsed = parse_record(&content);
        if parsed.is_none() {
            tracing::debug!(%id, path = %path.display(), "cache record malformed");
        }
        parsed
    }

    /// Records `fingerprint` for `id`, durably, before returning.
    pub fn put(&self, id: &SourceId, fingerprint: &Fingerprint) -> Result<(), CacheError> {
        let path = self.record_path(id);
        let dir = path.parent().unwrap_or(&self.root).to_path_buf();

        // `create_dir_all` already treats an existing directory as success,
        // including one created concurrently by another worker.
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;

        let tmp = dir.join(format!(
            ".{}{TEMP_MARKER}{}-{}",
            id.file_name(),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let result = write_synced(&tmp, format_record(fingerprint).as_bytes())
            .and_then(|()| std::fs::rename(&tmp, &path));
        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp);
            return Err(CacheError::io(&path, e));
        }

        // Persist the rename itself. Not every platform can open a directory.
        if let Ok(handle) = File::open(&dir) {
            let _ = handle.sync_all();
        }
        Ok(())
    }

    /// Removes the record for `id`. Returns `false` if there was none.
    pub fn remove(&self, id: &SourceId) -> Result<bool, CacheError> {
        let path = self.record_path(id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    /// Lists every identity that currently has a record, sorted.
    ///
    /// A missing cache root yields an empty list.
    pub fn entries(&self) -> Result<Vec<SourceId>, CacheError> {
        let mut ids = Vec::new();
        self.walk(&self.root, &mut Vec::new(), &mut |record| {
            if let Record::Entry(id, _) = record {
                ids.push(id);
            }
            Ok(())
        })?;
        ids.sort();
        Ok(ids)
    }

    /// Deletes every record whose identity is not in `live`, plus any
    /// temporary files left by interrupted writes. Directories emptied by
    /// the sweep are removed. Returns the number of records deleted.
    pub fn prune(&self, live: &HashSet<SourceId>) -> Result<usize, CacheError> {
        let mut removed = 0;
        self.walk(&self.root, &mut Vec::new(), &mut |record| {
            let path = match record {
                Record::Entry(id, _) if live.contains(&id) => return Ok(()),
                Record::Entry(id, path) => {
                    tracing::debug!(%id, "pruning cache record");
                    removed += 1;
                    path
                }
                Record::Temp(path) => path,
            };
            match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(CacheError::io(path, e)),
            }
        })?;
        remove_empty_dirs(&self.root, true)?;
        Ok(removed)
    }

    /// Deletes the whole cache. Returns `false` if there was nothing to delete.
    pub fn clear(&self) -> Result<bool, CacheError> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(&self.root, e)),
        }
    }

    fn walk(
        &self,
        dir: &Path,
        package: &mut Vec<String>,
        visit: &mut dyn FnMut(Record) -> Result<(), CacheError>,
    ) -> Result<(), CacheError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(CacheError::io(dir, e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(dir, e))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
            else {
                continue;
            };
            let file_type = entry.file_type().map_err(|e| CacheError::io(&path, e))?;

            if file_type.is_dir() {
                package.push(name);
                self.walk(&path, package, visit)?;
                package.pop();
            } else if name.starts_with('.') && name.contains(TEMP_MARKER) {
                visit(Record::Temp(path))?;
            } else if let Some(stem) = name.strip_suffix(&format!(".{RECORD_EXT}")) {
                let mut relative = package.clone();
                relative.push(stem.to_string());
                match SourceId::parse(&relative.join("/")) {
                    Ok(id) => visit(Record::Entry(id, path))?,
                    Err(_) => tracing::debug!(path = %path.display(), "ignoring unrecognized cache file"),
                }
            }
        }
        Ok(())
    }
}

/// A file found while walking the cache root.
enum Record {
    /// A fingerprint record and its path.
    Entry(SourceId, PathBuf),
    /// A temporary file from an interrupted write.
    Temp(PathBuf),
}

fn format_record(fingerprint: &Fingerprint) -> String {
    format!("{RECORD_MAGIC} {RECORD_VERSION} {RECORD_ALGORITHM} {fingerprint}\n")
}

fn parse_record(content: &str) -> Option<Fingerprint> {
    let line = content.strip_suffix('\n')?;
    let mut tokens = line.split(' ');
    if tokens.next()? != RECORD_MAGIC
        || tokens.next()? != RECORD_VERSION
        || tokens.next()? != RECORD_ALGORITHM
    {
        return None;
    }
    let digest = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    digest.parse().ok()
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// Removes empty directories below `dir`. Returns whether `dir` is now empty.
fn remove_empty_dirs(dir: &Path, is_root: bool) -> Result<bool, CacheError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(CacheError::io(dir, e)),
    };

    let mut empty = true;
    for entry in entries {
        let entry = entry.map_err(|e| CacheError::io(dir, e))?;
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map_err(|e| CacheError::io(&path, e))?
            .is_dir();
        if is_dir && remove_empty_dirs(&path, false)? {
            continue;
        }
        empty = false;
    }

    // A failed removal means another writer just dropped a record in here.
    if empty && !is_root && std::fs::remove_dir(dir).is_err() {
        return Ok(!dir.exists());
    }
    Ok(empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, FingerprintStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FingerprintStore::open(&dir.path().join("compiler-cache"));
        (dir, store)
    }

    fn id(s: &str) -> SourceId {
        SourceId::parse(s).unwrap()
    }

    #[test]
    fn put_and_get_roundtrip() {
        let (_dir, store) = make_store();
        let fp = Fingerprint::of(b"public class Program {}");
        store.put(&id("Program.java"), &fp).unwrap();
        assert_eq!(store.get(&id("Program.java")), Some(fp));
    }

    #[test]
    fn get_missing_is_absent() {
        let (_dir, store) = make_store();
        assert!(store.get(&id("engine/Minesweeper.java")).is_none());
    }

    #[test]
    fn missing_parent_directory_is_absent() {
        let (_dir, store) = make_store();
        store.put(&id("A.java"), &Fingerprint::of(b"a")).unwrap();
        assert!(store.get(&id("deep/pkg/B.java")).is_none());
    }

    #[test]
    fn record_path_mirrors_package() {
        let (_dir, store) = make_store();
        let path = store.record_path(&id("engine/gui/GameGUI.java"));
        assert!(path.ends_with(Path::new("engine/gui/GameGUI.java.hash")));
    }

    #[test]
    fn same_file_name_in_two_packages_does_not_collide() {
        let (_dir, store) = make_store();
        let a = Fingerprint::of(b"package a; class Util {}");
        let b = Fingerprint::of(b"package b; class Util {}");
        store.put(&id("a/Util.java"), &a).unwrap();
        store.put(&id("b/Util.java"), &b).unwrap();
        assert_eq!(store.get(&id("a/Util.java")), Some(a));
        assert_eq!(store.get(&id("b/Util.java")), Some(b));
    }

    #[test]
    fn put_overwrites() {
        let (_dir, store) = make_store();
        let first = Fingerprint::of(b"v1");
        let second = Fingerprint::of(b"v2");
        store.put(&id("A.java"), &first).unwrap();
        store.put(&id("A.java"), &second).unwrap();
        assert_eq!(store.get(&id("A.java")), Some(second));
    }

    #[test]
    fn record_is_single_text_line() {
        let (_dir, store) = make_store();
        let fp = Fingerprint::of(b"x");
        store.put(&id("A.java"), &fp).unwrap();
        let raw = std::fs::read_to_string(store.record_path(&id("A.java"))).unwrap();
        assert_eq!(raw, format!("javelin-fingerprint v1 sha256 {fp}\n"));
    }

    #[test]
    fn corrupt_record_is_absent() {
        let (_dir, store) = make_store();
        let path = store.record_path(&id("A.java"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        for garbage in [
            "",
            "garbage",
            "javelin-fingerprint v1 sha256 abcd\n",
            "javelin-fingerprint v2 sha256 e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n",
            // Truncated before the trailing newline.
            "javelin-fingerprint v1 sha256 e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        ] {
            std::fs::write(&path, garbage).unwrap();
            assert!(store.get(&id("A.java")).is_none(), "accepted {garbage:?}");
        }
    }

    #[test]
    fn record_written_by_old_script_is_absent() {
        // A bare hex digest with no header is not trusted.
        let (_dir, store) = make_store();
        let path = store.record_path(&id("A.java"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, Fingerprint::of(b"a").to_hex()).unwrap();
        assert!(store.get(&id("A.java")).is_none());
    }

    #[test]
    fn remove_existing_and_missing() {
        let (_dir, store) = make_store();
        store.put(&id("A.java"), &Fingerprint::of(b"a")).unwrap();
        assert!(store.remove(&id("A.java")).unwrap());
        assert!(!store.remove(&id("A.java")).unwrap());
        assert!(store.get(&id("A.java")).is_none());
    }

    #[test]
    fn entries_lists_all_records() {
        let (_dir, store) = make_store();
        store.put(&id("Program.java"), &Fingerprint::of(b"p")).unwrap();
        store
            .put(&id("engine/options/Options.java"), &Fingerprint::of(b"o"))
            .unwrap();
        let entries = store.entries().unwrap();
        assert_eq!(
            entries,
            vec![id("Program.java"), id("engine/options/Options.java")]
        );
    }

    #[test]
    fn entries_on_missing_root_is_empty() {
        let (_dir, store) = make_store();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn prune_removes_dead_records_and_empty_dirs() {
        let (_dir, store) = make_store();
        store.put(&id("Keep.java"), &Fingerprint::of(b"k")).unwrap();
        store
            .put(&id("gone/deep/Dead.java"), &Fingerprint::of(b"d"))
            .unwrap();

        let live: HashSet<SourceId> = [id("Keep.java")].into_iter().collect();
        assert_eq!(store.prune(&live).unwrap(), 1);

        assert!(store.get(&id("Keep.java")).is_some());
        assert!(!store.root().join("gone").exists());
        assert!(store.root().exists());
    }

    #[test]
    fn prune_cleans_leftover_temp_files() {
        let (_dir, store) = make_store();
        store.put(&id("A.java"), &Fingerprint::of(b"a")).unwrap();
        let tmp = store.root().join(".A.java.tmp-1-0");
        std::fs::write(&tmp, "partial").unwrap();

        let live: HashSet<SourceId> = [id("A.java")].into_iter().collect();
        assert_eq!(store.prune(&live).unwrap(), 0);
        assert!(!tmp.exists());
        assert!(store.get(&id("A.java")).is_some());
    }

    #[test]
    fn prune_missing_root_returns_zero() {
        let (_dir, store) = make_store();
        assert_eq!(store.prune(&HashSet::new()).unwrap(), 0);
    }

    #[test]
    fn clear_deletes_everything() {
        let (_dir, store) = make_store();
        store.put(&id("a/A.java"), &Fingerprint::of(b"a")).unwrap();
        assert!(store.clear().unwrap());
        assert!(!store.root().exists());
        assert!(store.get(&id("a/A.java")).is_none());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn concurrent_puts_in_one_package() {
        use std::sync::Arc;
        use std::thread;

        let (_dir, store) = make_store();
        let store = Arc::new(store);
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let id = SourceId::parse(&format!("shared/pkg/F{i}.java")).unwrap();
                    store.put(&id, &Fingerprint::of(id.as_str().as_bytes())).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.entries().unwrap().len(), 16);
        let f3 = id("shared/pkg/F3.java");
        assert_eq!(store.get(&f3), Some(Fingerprint::of(f3.as_str().as_bytes())));
    }
}
