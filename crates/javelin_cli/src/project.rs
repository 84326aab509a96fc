//! Locating the project and resolving its settings for a command.

use std::path::{Path, PathBuf};

use javelin_config::{
    find_project_root, load_config, load_config_from_str, resolve, Overrides, ProjectConfig,
    ResolvedConfig,
};

use crate::{GlobalArgs, OverrideArgs};

/// Finds the project directory and its parsed configuration.
///
/// With `--config`, a file is loaded directly and its directory becomes the
/// project directory; a directory must contain `javelin.toml`. Without it,
/// the nearest `javelin.toml` at or above `invocation_dir` is used. When none
/// exists the invocation directory is built with default settings.
pub fn locate(
    global: &GlobalArgs,
    invocation_dir: &Path,
) -> Result<(PathBuf, ProjectConfig), Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let path = invocation_dir.join(config_path);
        if path.is_file() {
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| invocation_dir.to_path_buf());
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            return Ok((dir, load_config_from_str(&content)?));
        }
        let config =
            load_config(&path).map_err(|e| format!("{}: {e}", path.join("javelin.toml").display()))?;
        return Ok((path, config));
    }

    match find_project_root(invocation_dir) {
        Some(dir) => {
            let config = load_config(&dir)?;
            Ok((dir, config))
        }
        None => {
            tracing::debug!(
                dir = %invocation_dir.display(),
                "no javelin.toml found, using defaults"
            );
            Ok((invocation_dir.to_path_buf(), ProjectConfig::default()))
        }
    }
}

/// Locates the project and merges its configuration with `args`, rejecting
/// layouts where the cache or output root would cover the sources.
pub fn settings(
    global: &GlobalArgs,
    args: &OverrideArgs,
    invocation_dir: &Path,
) -> Result<ResolvedConfig, Box<dyn std::error::Error>> {
    let (project_dir, config) = locate(global, invocation_dir)?;
    let settings = resolve(&config, &project_dir, invocation_dir, &overrides(args));
    settings.validate_layout()?;
    Ok(settings)
}

fn overrides(args: &OverrideArgs) -> Overrides {
    Overrides {
        source: args.source.clone(),
        output: args.output.clone(),
        cache: args.cache.clone(),
        classpath: args.classpath.clone(),
        main: args.main.clone(),
        jobs: args.jobs,
        no_prune: args.no_prune,
    }
}
