//! Source file discovery.

use std::path::{Path, PathBuf};

use javelin_common::SourceId;

use crate::error::BuildError;

/// A compilable file found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Identity relative to the source root.
    pub id: SourceId,
    /// Absolute path on disk.
    pub path: PathBuf,
}

/// Result of walking the source tree.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Compilable files, sorted by identity.
    pub files: Vec<SourceFile>,
    /// Subdirectories that could not be read and were left out.
    pub unreadable_dirs: Vec<(PathBuf, std::io::Error)>,
}

/// Recursively collects files under `root` whose extension is in `extensions`.
///
/// Directories equal to any of `excluded` (typically the cache and output
/// roots) are not entered, and neither are hidden directories such as `.git`.
/// Paths are canonicalized first so that exclusions match however they were
/// spelled. A missing or unreadable root is an error; an unreadable
/// subdirectory is recorded and skipped.
pub fn discover_sources(
    root: &Path,
    extensions: &[String],
    excluded: &[&Path],
) -> Result<Discovery, BuildError> {
    if !root.is_dir() {
        return Err(BuildError::SourceRootMissing(root.to_path_buf()));
    }
    let root = canonical(root);
    let excluded: Vec<PathBuf> = excluded.iter().map(|p| canonical(p)).collect();

    let entries = std::fs::read_dir(&root).map_err(|e| BuildError::Discovery {
        path: root.clone(),
        source: e,
    })?;

    let mut walker = Walker {
        root: &root,
        extensions,
        excluded: &excluded,
        discovery: Discovery::default(),
    };
    walker.visit(entries);

    let mut discovery = walker.discovery;
    discovery.files.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(discovery)
}

struct Walker<'a> {
    root: &'a Path,
    extensions: &'a [String],
    excluded: &'a [PathBuf],
    discovery: Discovery,
}

impl Walker<'_> {
    fn visit(&mut self, entries: std::fs::ReadDir) {
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                if self.is_excluded(&path) {
                    continue;
                }
                match std::fs::read_dir(&path) {
                    Ok(children) => self.visit(children),
                    Err(e) => self.discovery.unreadable_dirs.push((path, e)),
                }
            } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
                && self.has_source_extension(&path)
            {
                match SourceId::from_path(self.root, &path) {
                    Ok(id) => self.discovery.files.push(SourceFile { id, path }),
                    Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
                }
            }
        }
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        let hidden = dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        hidden || self.excluded.iter().any(|ex| ex == dir)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
