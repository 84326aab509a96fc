//! Resolution of a parsed configuration and command-line overrides into
//! absolute, ready-to-use build settings.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{ProjectConfig, ToolchainConfig};

/// Values supplied on the command line that take precedence over `javelin.toml`.
///
/// Relative override paths resolve against the invocation directory, not the
/// project directory.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Replacement source root.
    pub source: Option<PathBuf>,
    /// Replacement output root.
    pub output: Option<PathBuf>,
    /// Replacement cache root.
    pub cache: Option<PathBuf>,
    /// Replacement classpath. Empty keeps the configured entries.
    pub classpath: Vec<PathBuf>,
    /// Replacement entry point.
    pub main: Option<String>,
    /// Replacement worker count.
    pub jobs: Option<usize>,
    /// Disable the prune sweep for this invocation.
    pub no_prune: bool,
}

/// Fully resolved settings for one invocation. All paths are absolute
/// whenever the directories they were resolved against are absolute.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Display name of the project.
    pub name: String,
    /// Directory that relative configuration paths were resolved against.
    pub project_dir: PathBuf,
    /// Root of the source tree.
    pub source_root: PathBuf,
    /// Root that compiled classes are written under.
    pub output_root: PathBuf,
    /// Root of the fingerprint cache.
    pub cache_root: PathBuf,
    /// Ordered classpath entries.
    pub classpath: Vec<PathBuf>,
    /// Class to launch, if any.
    pub entry_point: Option<String>,
    /// Maximum number of concurrent compiles.
    pub jobs: usize,
    /// Extensions (without the dot) of compilable files.
    pub source_extensions: Vec<String>,
    /// Whether to prune records of deleted files before compiling.
    pub prune: bool,
    /// External compiler and launcher commands.
    pub toolchain: ToolchainConfig,
}

impl ResolvedConfig {
    /// Rejects layouts in which cache maintenance or `clean` could delete
    /// sources or compiled classes.
    ///
    /// The cache root must not be, or contain, the source root or the output
    /// root, and the output root must not be, or contain, the source root.
    /// Paths are compared after canonicalizing their longest existing prefix.
    pub fn validate_layout(&self) -> Result<(), ConfigError> {
        let source = canonical_prefix(&self.source_root);
        let output = canonical_prefix(&self.output_root);
        let cache = canonical_prefix(&self.cache_root);

        let checks = [
            ("cache", &cache, "source", &source),
            ("cache", &cache, "output", &output),
            ("output", &output, "source", &source),
        ];
        for (outer_key, outer, inner_key, inner) in checks {
            if inner.starts_with(outer) {
                return Err(ConfigError::ValidationError(format!(
                    "{outer_key} directory {} must not be or contain the {inner_key} directory {}",
                    outer.display(),
                    inner.display()
                )));
            }
        }
        Ok(())
    }
}

/// Canonicalizes the longest existing ancestor of `path` and appends the rest.
fn canonical_prefix(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = std::fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Merges `config` with `overrides`.
///
/// Paths from the configuration file are joined onto `project_dir`; paths from
/// `overrides` are joined onto `invocation_dir`. Absolute paths are kept as is.
pub fn resolve(
    config: &ProjectConfig,
    project_dir: &Path,
    invocation_dir: &Path,
    overrides: &Overrides,
) -> ResolvedConfig {
    let pick = |over: &Option<PathBuf>, configured: &str| match over {
        Some(path) => invocation_dir.join(path),
        None => project_dir.join(configured),
    };

    let classpath = if overrides.classpath.is_empty() {
        config
            .classpath
            .entries
            .iter()
            .map(|entry| project_dir.join(entry))
            .collect()
    } else {
        overrides
            .classpath
            .iter()
            .map(|entry| invocation_dir.join(entry))
            .collect()
    };

    let entry_point = overrides
        .main
        .clone()
        .unwrap_or_else(|| config.project.main.clone());
    let entry_point = (!entry_point.trim().is_empty()).then_some(entry_point);

    let jobs = overrides
        .jobs
        .or(config.build.jobs)
        .unwrap_or_else(default_jobs)
        .max(1);

    let name = if config.project.name.is_empty() {
        project_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string()
    } else {
        config.project.name.clone()
    };

    ResolvedConfig {
        name,
        project_dir: project_dir.to_path_buf(),
        source_root: normalize(&pick(&overrides.source, &config.paths.source)),
        output_root: normalize(&pick(&overrides.output, &config.paths.output)),
        cache_root: normalize(&pick(&overrides.cache, &config.paths.cache)),
        classpath,
        entry_point,
        jobs,
        source_extensions: config.build.source_extensions.clone(),
        prune: config.cache.prune && !overrides.no_prune,
        toolchain: config.toolchain.clone(),
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Removes `.` components so that `project/./out` and `project/out` compare
/// equal when excluding directories from the source walk.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
