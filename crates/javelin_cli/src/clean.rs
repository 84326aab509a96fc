//! `javelin clean`: drop the fingerprint cache, and optionally compiled classes.

use std::io::ErrorKind;
use std::path::Path;

use javelin_cache::FingerprintStore;
use javelin_config::ResolvedConfig;

use crate::project::settings;
use crate::{CleanArgs, GlobalArgs, OverrideArgs};

/// Runs the `javelin clean` command.
pub fn run(args: &CleanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let invocation_dir = std::env::current_dir()?;
    let config = settings(global, &OverrideArgs::default(), &invocation_dir)?;

    for removed in clean(&config, args.all)? {
        if !global.quiet {
            eprintln!("     Removed {}", removed.display());
        }
    }
    Ok(0)
}

/// Deletes the cache root, and the output root when `all` is set.
/// Returns the directories that existed and were removed.
fn clean(config: &ResolvedConfig, all: bool) -> Result<Vec<&Path>, Box<dyn std::error::Error>> {
    config.validate_layout()?;
    let mut removed = Vec::new();
    if FingerprintStore::open(&config.cache_root).clear()? {
        removed.push(config.cache_root.as_path());
    }
    if all {
        match std::fs::remove_dir_all(&config.output_root) {
            Ok(()) => removed.push(config.output_root.as_path()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(format!("failed to remove {}: {e}", config.output_root.display()).into())
            }
        }
    }
    Ok(removed)
}
