//! Per-file outcomes and the pass summary.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use javelin_cache::CacheError;
use javelin_common::SourceId;

use crate::error::CompileError;

/// Why a compiled file's fingerprint was not recorded.
#[derive(Debug)]
pub enum Unrecorded {
    /// Writing the record failed.
    CacheWrite(CacheError),
    /// The file's content could not be read for fingerprinting.
    UnreadableSource(std::io::Error),
}

impl fmt::Display for Unrecorded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unrecorded::CacheWrite(e) => write!(f, "fingerprint not recorded: {e}"),
            Unrecorded::UnreadableSource(e) => {
                write!(f, "fingerprint not recorded, source unreadable: {e}")
            }
        }
    }
}

/// Why a file produced no classes.
#[derive(Debug)]
pub enum FileFailure {
    /// The compiler rejected the file or could not be run.
    Compile {
        /// The compile error.
        error: CompileError,
        /// The fingerprint read error, if the content was also unreadable.
        read_error: Option<std::io::Error>,
    },
    /// The output package directory could not be created.
    OutputDir {
        /// The directory.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFailure::Compile {
                error,
                read_error: None,
            } => write!(f, "{error}"),
            FileFailure::Compile {
                error,
                read_error: Some(read),
            } => write!(f, "{error} (source was also unreadable: {read})"),
            FileFailure::OutputDir { path, source } => {
                write!(f, "failed to create {}: {source}", path.display())
            }
        }
    }
}

/// Terminal state of one file after a pass.
#[derive(Debug)]
pub enum FileOutcome {
    /// Unchanged since its last successful compile.
    Skipped,
    /// Compiled and recorded.
    Compiled,
    /// Compiled, but will be compiled again next pass.
    CompiledUnrecorded(Unrecorded),
    /// Not compiled. The store was not touched.
    Failed(FileFailure),
}

impl FileOutcome {
    /// Returns `true` if the compiler accepted the file this pass.
    pub fn is_compiled(&self) -> bool {
        matches!(self, FileOutcome::Compiled | FileOutcome::CompiledUnrecorded(_))
    }
}

/// A file and what happened to it.
#[derive(Debug)]
pub struct FileResult {
    /// The file.
    pub id: SourceId,
    /// What happened.
    pub outcome: FileOutcome,
}

/// Summary of one build pass.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Per-file results, sorted by identity.
    pub results: Vec<FileResult>,
    /// Records removed by the prune sweep.
    pub pruned: usize,
    /// Wall-clock time of the pass.
    pub elapsed: Duration,
}

impl BuildReport {
    /// Number of files the compiler accepted.
    pub fn compiled_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_compiled()).count()
    }

    /// Number of files skipped as unchanged.
    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Skipped))
            .count()
    }

    /// Number of files that failed.
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Number of compiled files whose record could not be written.
    pub fn cache_write_failures(&self) -> usize {
        self.results
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    FileOutcome::CompiledUnrecorded(Unrecorded::CacheWrite(_))
                )
            })
            .count()
    }

    /// Returns `true` when no file failed.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Iterates over failed files and their failures.
    pub fn failures(&self) -> impl Iterator<Item = (&SourceId, &FileFailure)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            FileOutcome::Failed(failure) => Some((&r.id, failure)),
            _ => None,
        })
    }
}
