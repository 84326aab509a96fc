//! The incremental build pass.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use javelin_cache::{ChangeDetector, FingerprintStore};
use javelin_common::{Fingerprint, SourceId};
use javelin_config::ResolvedConfig;
use rayon::prelude::*;

use crate::classpath::Classpath;
use crate::discover::{discover_sources, SourceFile};
use crate::error::BuildError;
use crate::events::{BuildEvent, EventSink};
use crate::report::{BuildReport, FileFailure, FileOutcome, FileResult, Unrecorded};
use crate::toolchain::Compiler;

/// Runs build passes over one project.
pub struct Orchestrator<'a> {
    config: &'a ResolvedConfig,
    compiler: &'a dyn Compiler,
    sink: &'a dyn EventSink,
    store: FingerprintStore,
}

impl<'a> Orchestrator<'a> {
    /// Creates an orchestrator. Nothing touches the disk until [`run_pass`](Self::run_pass).
    pub fn new(
        config: &'a ResolvedConfig,
        compiler: &'a dyn Compiler,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            config,
            compiler,
            sink,
            store: FingerprintStore::open(&config.cache_root),
        }
    }

    /// Returns the fingerprint store this orchestrator records into.
    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    /// Runs one pass: discover, prune, then compile every stale file.
    ///
    /// Nothing is touched on disk if the configured roots overlap unsafely.
    /// Per-file failures are recorded in the report and never abort the pass.
    pub fn run_pass(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let config = self.config;
        config.validate_layout()?;

        let discovery = discover_sources(
            &config.source_root,
            &config.source_extensions,
            &[&config.cache_root, &config.output_root],
        )?;
        for (dir, err) in &discovery.unreadable_dirs {
            tracing::warn!("skipping unreadable directory {}: {err}", dir.display());
        }

        std::fs::create_dir_all(&config.output_root).map_err(|e| BuildError::OutputDir {
            path: config.output_root.clone(),
            source: e,
        })?;

        let pruned = if config.prune {
            self.prune(&discovery.files)
        } else {
            0
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs.max(1))
            .build()?;
        let classpath = Classpath::new(config.classpath.iter().cloned())
            .with_leading(&config.source_root);

        tracing::debug!(
            files = discovery.files.len(),
            jobs = config.jobs,
            "starting build pass"
        );
        let mut results: Vec<FileResult> = pool.install(|| {
            discovery
                .files
                .par_iter()
                .map(|file| FileResult {
                    id: file.id.clone(),
                    outcome: self.process(file, &classpath),
                })
                .collect()
        });
        results.sort_by(|a, b| a.id.cmp(&b.id));

        let report = BuildReport {
            results,
            pruned,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            compiled = report.compiled_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            pruned = report.pruned,
            "build pass finished in {:.2?}",
            report.elapsed
        );
        Ok(report)
    }

    fn prune(&self, files: &[SourceFile]) -> usize {
        let live: HashSet<SourceId> = files.iter().map(|f| f.id.clone()).collect();
        match self.store.prune(&live) {
            Ok(count) => {
                if count > 0 {
                    tracing::debug!(count, "pruned records of deleted sources");
                }
                self.sink.emit(BuildEvent::Pruned { count });
                count
            }
            Err(e) => {
                tracing::warn!("cache prune failed: {e}");
                0
            }
        }
    }

    fn process(&self, file: &SourceFile, classpath: &Classpath) -> FileOutcome {
        let id = &file.id;

        let package_dir = self.package_output_dir(id);
        if let Err(e) = std::fs::create_dir_all(&package_dir) {
            let failure = FileFailure::OutputDir {
                path: package_dir,
                source: e,
            };
            self.sink.emit(BuildEvent::Failed {
                id: id.clone(),
                message: failure.to_string(),
            });
            return FileOutcome::Failed(failure);
        }

        let fingerprint = Fingerprint::of_file(&file.path);
        let detector = ChangeDetector::new(&self.store);
        if !detector.is_stale(id, fingerprint.as_ref().ok()) {
            self.sink.emit(BuildEvent::Skipped(id.clone()));
            return FileOutcome::Skipped;
        }

        self.sink.emit(BuildEvent::Compiling(id.clone()));
        if let Err(error) = self
            .compiler
            .compile(&file.path, &self.config.output_root, classpath)
        {
            let failure = FileFailure::Compile {
                error,
                read_error: fingerprint.err(),
            };
            tracing::debug!(%id, "compile failed: {failure}");
            self.sink.emit(BuildEvent::Failed {
                id: id.clone(),
                message: failure.to_string(),
            });
            return FileOutcome::Failed(failure);
        }
        self.sink.emit(BuildEvent::Compiled(id.clone()));

        let fingerprint = match fingerprint {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                tracing::warn!("{id} compiled but could not be fingerprinted: {e}");
                return FileOutcome::CompiledUnrecorded(Unrecorded::UnreadableSource(e));
            }
        };
        match self.store.put(id, &fingerprint) {
            Ok(()) => FileOutcome::Compiled,
            Err(e) => {
                tracing::warn!("{id} compiled but its fingerprint was not recorded: {e}");
                self.sink.emit(BuildEvent::CacheWriteFailed {
                    id: id.clone(),
                    message: e.to_string(),
                });
                FileOutcome::CompiledUnrecorded(Unrecorded::CacheWrite(e))
            }
        }
    }

    fn package_output_dir(&self, id: &SourceId) -> PathBuf {
        let mut dir = self.config.output_root.clone();
        dir.extend(id.package());
        dir
    }
}
