//! `javelin status`: what the next pass would compile, without compiling.

use javelin_build::discover_sources;
use javelin_cache::{ChangeDetector, ChangeSet, FingerprintStore};
use javelin_common::Fingerprint;
use javelin_config::ResolvedConfig;

use crate::project::settings;
use crate::{GlobalArgs, ReportFormat, StatusArgs};

/// Runs the `javelin status` command.
///
/// Returns exit code 0 whether or not anything is stale.
pub fn run(args: &StatusArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let invocation_dir = std::env::current_dir()?;
    let config = settings(global, &args.overrides, &invocation_dir)?;
    let changes = collect(&config)?;

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&changes)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
    }
    Ok(0)
}

/// Fingerprints every source file and classifies it against the cache.
pub fn collect(config: &ResolvedConfig) -> Result<ChangeSet, Box<dyn std::error::Error>> {
    let discovery = discover_sources(
        &config.source_root,
        &config.source_extensions,
        &[&config.cache_root, &config.output_root],
    )?;
    let files: Vec<_> = discovery
        .files
        .iter()
        .map(|file| (file.id.clone(), Fingerprint::of_file(&file.path).ok()))
        .collect();

    let store = FingerprintStore::open(&config.cache_root);
    Ok(ChangeDetector::new(&store).detect_changes(&files)?)
}

fn render_text(changes: &ChangeSet) -> String {
    let mut out = String::new();
    let sections = [
        ("new", &changes.new_files),
        ("modified", &changes.modified_files),
        ("unreadable", &changes.unreadable_files),
        ("deleted", &changes.deleted_files),
    ];
    for (label, ids) in sections {
        for id in ids {
            out.push_str(&format!("{label:>10}  {id}\n"));
        }
    }
    out.push_str(&format!(
        "{} to compile, {} up to date, {} deleted\n",
        changes.stale_count(),
        changes.unchanged_files.len(),
        changes.deleted_files.len()
    ));
    out
}
