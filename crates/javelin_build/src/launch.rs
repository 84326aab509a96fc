//! Starting the program after a clean pass.

use javelin_config::ResolvedConfig;

use crate::classpath::Classpath;
use crate::error::BuildError;
use crate::report::BuildReport;
use crate::toolchain::Runner;

/// What the launch step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The runner was invoked and reported success.
    Launched,
    /// The pass had failures, so the runner was not invoked.
    Suppressed {
        /// Number of files that failed.
        failed: usize,
    },
}

/// Launches the configured entry point if `report` has no failures.
///
/// The runner receives the output root and the configured classpath entries;
/// it decides where the output root goes on the final command line.
pub fn launch(
    report: &BuildReport,
    runner: &dyn Runner,
    config: &ResolvedConfig,
) -> Result<LaunchOutcome, BuildError> {
    let failed = report.failed_count();
    if failed > 0 {
        tracing::info!(failed, "launch suppressed");
        return Ok(LaunchOutcome::Suppressed { failed });
    }

    let entry_point = config
        .entry_point
        .as_deref()
        .ok_or(BuildError::NoEntryPoint)?;
    let classpath = Classpath::new(config.classpath.iter().cloned());
    runner.launch(&config.output_root, &classpath, entry_point)?;
    tracing::info!(entry_point, "launched");
    Ok(LaunchOutcome::Launched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompileError, LaunchError};
    use crate::report::{FileFailure, FileOutcome, FileResult};
    use javelin_common::SourceId;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct FakeRunner {
        calls: RefCell<Vec<(PathBuf, Vec<PathBuf>, String)>>,
        fail: bool,
    }

    impl Runner for FakeRunner {
        fn launch(
            &self,
            output_root: &Path,
            classpath: &Classpath,
            entry_point: &str,
        ) -> Result<(), LaunchError> {
            self.calls.borrow_mut().push((
                output_root.to_path_buf(),
                classpath.entries().to_vec(),
                entry_point.to_string(),
            ));
            if self.fail {
                return Err(LaunchError::Exited { status: Some(2) });
            }
            Ok(())
        }
    }

    fn config() -> ResolvedConfig {
        javelin_config::resolve(
            &javelin_config::ProjectConfig::default(),
            Path::new("/project"),
            Path::new("/project"),
            &javelin_config::Overrides {
                classpath: vec![PathBuf::from("lib/lanterna-3.1.1.jar")],
                ..Default::default()
            },
        )
    }

    fn failed_report() -> BuildReport {
        BuildReport {
            results: vec![FileResult {
                id: SourceId::parse("A.java").unwrap(),
                outcome: FileOutcome::Failed(FileFailure::Compile {
                    error: CompileError::Rejected {
                        status: Some(1),
                        stderr: String::new(),
                    },
                    read_error: None,
                }),
            }],
            ..BuildReport::default()
        }
    }

    #[test]
    fn launches_after_clean_pass() {
        let runner = FakeRunner::default();
        let outcome = launch(&BuildReport::default(), &runner, &config()).unwrap();
        assert_eq!(outcome, LaunchOutcome::Launched);

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (output, classpath, entry) = &calls[0];
        assert_eq!(output, Path::new("/project/out"));
        assert_eq!(classpath, &vec![PathBuf::from("/project/lib/lanterna-3.1.1.jar")]);
        assert_eq!(entry, "Program");
    }

    #[test]
    fn failures_suppress_launch() {
        let runner = FakeRunner::default();
        let outcome = launch(&failed_report(), &runner, &config()).unwrap();
        assert_eq!(outcome, LaunchOutcome::Suppressed { failed: 1 });
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn missing_entry_point_is_an_error() {
        let mut config = config();
        config.entry_point = None;
        let err = launch(&BuildReport::default(), &FakeRunner::default(), &config).unwrap_err();
        assert!(matches!(err, BuildError::NoEntryPoint));
    }

    #[test]
    fn runner_error_becomes_build_error() {
        let runner = FakeRunner {
            fail: true,
            ..FakeRunner::default()
        };
        let err = launch(&BuildReport::default(), &runner, &config()).unwrap_err();
        assert!(matches!(err, BuildError::Launch(LaunchError::Exited { .. })));
    }
}
