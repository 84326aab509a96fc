//! `javelin build` and `javelin run`: one incremental pass, optionally
//! followed by launching the program.

use javelin_build::{
    launch, BuildEvent, BuildReport, EventSink, JavaLauncher, Javac, LaunchOutcome, Orchestrator,
};

use crate::project::settings;
use crate::{GlobalArgs, OverrideArgs};

/// Prints per-file progress to stderr.
///
/// Failures are always printed; everything else is silenced by `--quiet`.
/// Skipped files are listed only with `--verbose`.
pub struct ConsoleSink {
    quiet: bool,
    verbose: bool,
}

impl ConsoleSink {
    /// Creates a sink honoring the global verbosity flags.
    pub fn new(global: &GlobalArgs) -> Self {
        Self {
            quiet: global.quiet,
            verbose: global.verbose,
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: BuildEvent) {
        match event {
            BuildEvent::Failed { id, message } => {
                eprintln!("      Failed {id}");
                for line in message.lines() {
                    eprintln!("             {line}");
                }
            }
            _ if self.quiet => {}
            BuildEvent::Compiling(id) => eprintln!("   Compiling {id}"),
            BuildEvent::Skipped(id) if self.verbose => eprintln!("  Up-to-date {id}"),
            BuildEvent::Pruned { count } if count > 0 => {
                eprintln!("      Pruned {count} stale cache record(s)")
            }
            // Logged by the build pass as a warning.
            BuildEvent::CacheWriteFailed { .. } => {}
            BuildEvent::Skipped(_) | BuildEvent::Pruned { .. } | BuildEvent::Compiled(_) => {}
        }
    }
}

/// Runs `javelin build` (`launch == false`) or `javelin run`.
///
/// Returns exit code 0 when every file compiled and, for `run`, the program
/// was started; 1 otherwise.
pub fn run(
    args: &OverrideArgs,
    global: &GlobalArgs,
    launch_after: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let invocation_dir = std::env::current_dir()?;
    let config = settings(global, args, &invocation_dir)?;

    if !global.quiet {
        eprintln!(
            "    Building {} ({})",
            config.name,
            config.source_root.display()
        );
    }

    let compiler = Javac::from_config(&config.toolchain);
    let sink = ConsoleSink::new(global);
    let report = Orchestrator::new(&config, &compiler, &sink).run_pass()?;

    if !global.quiet {
        eprintln!("    {}", summary(&report));
    }

    if !launch_after {
        return Ok(if report.is_success() { 0 } else { 1 });
    }

    let runner = JavaLauncher::from_config(&config.toolchain);
    match launch(&report, &runner, &config)? {
        LaunchOutcome::Launched => {
            if !global.quiet {
                if let Some(ref entry) = config.entry_point {
                    eprintln!("     Running {entry}");
                }
            }
            Ok(0)
        }
        LaunchOutcome::Suppressed { failed } => {
            eprintln!("error: not launching, {failed} file(s) failed to compile");
            Ok(1)
        }
    }
}

/// One-line summary of a pass.
fn summary(report: &BuildReport) -> String {
    let mut line = format!(
        "Finished: {} compiled, {} up to date, {} failed",
        report.compiled_count(),
        report.skipped_count(),
        report.failed_count()
    );
    let unrecorded = report.cache_write_failures();
    if unrecorded > 0 {
        line.push_str(&format!(", {unrecorded} not cached"));
    }
    line.push_str(&format!(" in {:.2}s", report.elapsed.as_secs_f64()));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_build::{FileOutcome, FileResult};
    use javelin_common::SourceId;
    use std::time::Duration;

    fn result(name: &str, outcome: FileOutcome) -> FileResult {
        FileResult {
            id: SourceId::parse(name).unwrap(),
            outcome,
        }
    }

    #[test]
    fn summary_counts() {
        let report = BuildReport {
            results: vec![
                result("A.java", FileOutcome::Compiled),
                result("B.java", FileOutcome::Skipped),
                result("C.java", FileOutcome::Skipped),
            ],
            pruned: 0,
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            summary(&report),
            "Finished: 1 compiled, 2 up to date, 0 failed in 1.50s"
        );
    }

    #[test]
    fn summary_of_empty_pass() {
        let report = BuildReport::default();
        assert_eq!(
            summary(&report),
            "Finished: 0 compiled, 0 up to date, 0 failed in 0.00s"
        );
    }
}
