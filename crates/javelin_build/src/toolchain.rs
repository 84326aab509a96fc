//! External compiler and launcher capabilities.
//!
//! The build pass only needs two things from a toolchain: compile one source
//! file into an output root, and start the compiled program. Both are traits
//! so that the pass can be exercised without a JDK.

use std::path::Path;
use std::process::Command;

use javelin_config::ToolchainConfig;

use crate::classpath::Classpath;
use crate::error::{CompileError, LaunchError};

/// Compiles a single source file.
///
/// Implementations must be callable from several worker threads at once.
pub trait Compiler: Send + Sync {
    /// Compiles `source`, writing class files under `output_root`.
    fn compile(
        &self,
        source: &Path,
        output_root: &Path,
        classpath: &Classpath,
    ) -> Result<(), CompileError>;
}

/// Starts the compiled program.
pub trait Runner {
    /// Launches `entry_point` with `output_root` and `classpath` available.
    fn launch(
        &self,
        output_root: &Path,
        classpath: &Classpath,
        entry_point: &str,
    ) -> Result<(), LaunchError>;
}

/// Compiler backed by a `javac` executable.
#[derive(Debug, Clone)]
pub struct Javac {
    program: String,
    extra_args: Vec<String>,
}

impl Javac {
    /// Creates a compiler that runs `program` with `extra_args` before the source file.
    pub fn new(program: impl Into<String>, extra_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            extra_args,
        }
    }

    /// Creates a compiler from the `[toolchain]` configuration section.
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self::new(config.javac.clone(), config.javac_args.clone())
    }

    fn command(
        &self,
        source: &Path,
        output_root: &Path,
        classpath: &Classpath,
    ) -> Result<Command, CompileError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-d").arg(output_root);
        if !classpath.is_empty() {
            cmd.arg("-cp").arg(classpath.join()?);
        }
        cmd.args(&self.extra_args).arg(source);
        Ok(cmd)
    }
}

impl Compiler for Javac {
    fn compile(
        &self,
        source: &Path,
        output_root: &Path,
        classpath: &Classpath,
    ) -> Result<(), CompileError> {
        let output = self
            .command(source, output_root, classpath)?
            .output()
            .map_err(|e| CompileError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                tracing::debug!(source = %source.display(), "javac: {}", stderr.trim());
            }
            return Ok(());
        }

        Err(CompileError::Rejected {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Runner backed by a `java` executable.
#[derive(Debug, Clone)]
pub struct JavaLauncher {
    program: String,
    extra_args: Vec<String>,
    wait: bool,
}

impl JavaLauncher {
    /// Creates a launcher. When `wait` is false the program is started and
    /// left running; otherwise its exit status is checked.
    pub fn new(program: impl Into<String>, extra_args: Vec<String>, wait: bool) -> Self {
        Self {
            program: program.into(),
            extra_args,
            wait,
        }
    }

    /// Creates a launcher from the `[toolchain]` configuration section.
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self::new(config.java.clone(), config.java_args.clone(), config.wait)
    }
}

impl Runner for JavaLauncher {
    fn launch(
        &self,
        output_root: &Path,
        classpath: &Classpath,
        entry_point: &str,
    ) -> Result<(), LaunchError> {
        let joined = classpath.with_trailing(output_root).join()?;
        let mut cmd = Command::new(&self.program);
        cmd.arg("-cp")
            .arg(joined)
            .args(&self.extra_args)
            .arg(entry_point);

        let spawn_error = |e| LaunchError::Spawn {
            program: self.program.clone(),
            source: e,
        };

        if self.wait {
            let status = cmd.status().map_err(spawn_error)?;
            if !status.success() {
                return Err(LaunchError::Exited {
                    status: status.code(),
                });
            }
        } else {
            let mut child = cmd.spawn().map_err(spawn_error)?;
            tracing::debug!(pid = child.id(), entry_point, "launched");
            // Reap the child if it exits while we are still running.
            std::thread::spawn(move || {
                let _ = child.wait();
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn javac_command_line() {
        let javac = Javac::new("javac", vec!["-Xlint:all".to_string()]);
        let cp = Classpath::new([PathBuf::from("lib.jar")]);
        let cmd = javac
            .command(Path::new("src/A.java"), Path::new("out"), &cp)
            .unwrap();
        assert_eq!(cmd.get_program(), "javac");
        assert_eq!(
            args_of(&cmd),
            vec!["-d", "out", "-cp", "lib.jar", "-Xlint:all", "src/A.java"]
        );
    }

    #[test]
    fn javac_omits_empty_classpath() {
        let javac = Javac::new("javac", Vec::new());
        let cmd = javac
            .command(Path::new("A.java"), Path::new("out"), &Classpath::default())
            .unwrap();
        assert_eq!(args_of(&cmd), vec!["-d", "out", "A.java"]);
    }

    #[test]
    fn from_config_uses_toolchain_section() {
        let config = ToolchainConfig {
            javac: "/jdk/bin/javac".to_string(),
            javac_args: vec!["-g".to_string()],
            ..ToolchainConfig::default()
        };
        let javac = Javac::from_config(&config);
        let cmd = javac
            .command(Path::new("A.java"), Path::new("o"), &Classpath::default())
            .unwrap();
        assert_eq!(cmd.get_program(), "/jdk/bin/javac");
        assert!(args_of(&cmd).contains(&"-g".to_string()));
    }

    #[test]
    fn missing_compiler_is_spawn_error() {
        let javac = Javac::new("javelin-test-no-such-javac", Vec::new());
        let err = javac
            .compile(Path::new("A.java"), Path::new("out"), &Classpath::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Spawn { .. }));
    }

    #[test]
    fn missing_launcher_is_spawn_error() {
        let java = JavaLauncher::new("javelin-test-no-such-java", Vec::new(), false);
        let err = java
            .launch(Path::new("out"), &Classpath::default(), "Program")
            .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_compiler_is_rejected() {
        // `false` ignores its arguments and exits with status 1.
        let javac = Javac::new("false", Vec::new());
        let err = javac
            .compile(Path::new("A.java"), Path::new("out"), &Classpath::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Rejected { status: Some(1), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn succeeding_compiler_is_ok() {
        let javac = Javac::new("true", Vec::new());
        javac
            .compile(Path::new("A.java"), Path::new("out"), &Classpath::default())
            .unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn waiting_launcher_reports_exit_status() {
        let java = JavaLauncher::new("false", Vec::new(), true);
        let err = java
            .launch(Path::new("out"), &Classpath::default(), "Program")
            .unwrap_err();
        assert!(matches!(err, LaunchError::Exited { status: Some(1) }));
    }
}
