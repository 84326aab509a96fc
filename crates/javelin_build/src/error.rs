//! Error types for build passes, compiles, and launches.

use std::path::PathBuf;

/// Errors that abort a whole build pass or its launch step.
///
/// Failures that concern a single source file never become a `BuildError`;
/// they are recorded in that file's [`FileOutcome`](crate::FileOutcome) and
/// the pass continues.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The source, output, and cache roots overlap unsafely.
    #[error(transparent)]
    Config(#[from] javelin_config::ConfigError),

    /// The configured source root does not exist or is not a directory.
    #[error("source root {0} does not exist")]
    SourceRootMissing(PathBuf),

    /// The source root could not be listed.
    #[error("failed to read source directory {path}: {source}")]
    Discovery {
        /// The directory that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The output root could not be created.
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// The output directory.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The worker pool could not be started.
    #[error("failed to start compile workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A launch was requested but no entry point is configured.
    #[error("no entry point configured; set project.main in javelin.toml or pass --main")]
    NoEntryPoint,

    /// The program could not be launched.
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// A classpath that cannot be expressed on the current platform.
#[derive(Debug, thiserror::Error)]
pub enum ClasspathError {
    /// An entry contains the platform's path list separator.
    #[error("classpath entry {entry} contains the platform path separator")]
    InvalidEntry {
        /// The offending entry.
        entry: PathBuf,
    },
}

/// The external compiler did not produce classes for a source file.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The compiler process could not be started.
    #[error("failed to start compiler '{program}': {source}")]
    Spawn {
        /// The compiler executable.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler ran and reported failure.
    #[error("compiler exited with {}{}", exit_status(.status), diagnostics(.stderr))]
    Rejected {
        /// Exit code, or `None` if the process was terminated by a signal.
        status: Option<i32>,
        /// Captured compiler diagnostics.
        stderr: String,
    },

    /// The classpath could not be passed to the compiler.
    #[error(transparent)]
    Classpath(#[from] ClasspathError),
}

/// The external launcher failed.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The launcher process could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// The launcher executable.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The launched program exited unsuccessfully (only checked when waiting).
    #[error("program exited with {}", exit_status(.status))]
    Exited {
        /// Exit code, or `None` if the process was terminated by a signal.
        status: Option<i32>,
    },

    /// The classpath could not be passed to the launcher.
    #[error(transparent)]
    Classpath(#[from] ClasspathError),
}

fn exit_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn diagnostics(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_includes_diagnostics() {
        let err = CompileError::Rejected {
            status: Some(1),
            stderr: "A.java:3: error: ';' expected".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("compiler exited with status 1:"));
        assert!(msg.contains("';' expected"));
    }

    #[test]
    fn rejected_display_without_stderr() {
        let err = CompileError::Rejected {
            status: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "compiler exited with a signal");
    }

    #[test]
    fn spawn_display_names_program() {
        let err = CompileError::Spawn {
            program: "javac".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("'javac'"));
    }

    #[test]
    fn launch_error_is_transparent_in_build_error() {
        let err: BuildError = LaunchError::Exited { status: Some(3) }.into();
        assert_eq!(err.to_string(), "program exited with status 3");
    }

    #[test]
    fn source_root_missing_display() {
        let err = BuildError::SourceRootMissing(PathBuf::from("/nope"));
        assert!(err.to_string().contains("/nope"));
    }
}
