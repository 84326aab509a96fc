//! Javelin CLI: incremental compile-and-run for Java source trees.
//!
//! Provides `javelin build` for one incremental pass, `javelin run` (the
//! default) to build and then launch the program, `javelin status` to list
//! what the next pass would compile, `javelin clean` to drop the fingerprint
//! cache, and `javelin init` to write a starter `javelin.toml`.

#![warn(missing_docs)]

mod build;
mod clean;
mod init;
mod project;
mod status;

use std::path::PathBuf;
use std::process;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Javelin: compiles only what changed, then runs it.
#[derive(Parser, Debug)]
#[command(name = "javelin", version, about = "Incremental Java build driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `javelin.toml` file, or a directory containing one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run. Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one incremental build pass.
    Build(OverrideArgs),
    /// Build, then launch the entry point if every file compiled.
    Run(OverrideArgs),
    /// Show which files the next pass would compile.
    Status(StatusArgs),
    /// Delete the fingerprint cache.
    Clean(CleanArgs),
    /// Write a default `javelin.toml`.
    Init {
        /// Directory to initialize. Defaults to the current directory.
        dir: Option<PathBuf>,
    },
}

/// Command-line replacements for `javelin.toml` settings.
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Source root.
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output root for compiled classes.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Fingerprint cache root.
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Classpath entry; repeat to add more. Replaces the configured entries.
    #[arg(long = "classpath", value_name = "ENTRY")]
    pub classpath: Vec<PathBuf>,

    /// Fully qualified class to launch.
    #[arg(long)]
    pub main: Option<String>,

    /// Maximum number of concurrent compiles.
    #[arg(short, long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub jobs: Option<usize>,

    /// Keep cache records of deleted sources.
    #[arg(long)]
    pub no_prune: bool,
}

/// Arguments for the `javelin status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Setting overrides.
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for the `javelin clean` subcommand.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Also delete the output root.
    #[arg(long)]
    pub all: bool,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file or the directory holding it.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        None => build::run(&OverrideArgs::default(), &global, true),
        Some(Command::Build(ref args)) => build::run(args, &global, false),
        Some(Command::Run(ref args)) => build::run(args, &global, true),
        Some(Command::Status(ref args)) => status::run(args, &global),
        Some(Command::Clean(ref args)) => clean::run(args, &global),
        Some(Command::Init { dir }) => init::run(dir, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the log subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_logging(global: &GlobalArgs) {
    let default_level = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::parse_from(["javelin"]);
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_build_overrides() {
        let cli = Cli::parse_from([
            "javelin",
            "build",
            "--source",
            "src",
            "--output",
            "classes",
            "--cache",
            ".javelin",
            "--classpath",
            "lanterna-3.1.1.jar",
            "--classpath",
            "json-java.jar",
            "-j",
            "4",
            "--no-prune",
        ]);
        match cli.command {
            Some(Command::Build(ref args)) => {
                assert_eq!(args.source, Some(PathBuf::from("src")));
                assert_eq!(args.output, Some(PathBuf::from("classes")));
                assert_eq!(args.cache, Some(PathBuf::from(".javelin")));
                assert_eq!(
                    args.classpath,
                    vec![
                        PathBuf::from("lanterna-3.1.1.jar"),
                        PathBuf::from("json-java.jar")
                    ]
                );
                assert_eq!(args.jobs, Some(4));
                assert!(args.no_prune);
                assert!(args.main.is_none());
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_run_with_main() {
        let cli = Cli::parse_from(["javelin", "run", "--main", "engine.Game"]);
        match cli.command {
            Some(Command::Run(ref args)) => {
                assert_eq!(args.main.as_deref(), Some("engine.Game"));
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["javelin", "build", "-j", "0"]).is_err());
    }

    #[test]
    fn parse_status_json() {
        let cli = Cli::parse_from(["javelin", "status", "--format", "json"]);
        match cli.command {
            Some(Command::Status(ref args)) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Status command"),
        }
    }

    #[test]
    fn parse_status_default_text() {
        let cli = Cli::parse_from(["javelin", "status"]);
        match cli.command {
            Some(Command::Status(ref args)) => assert_eq!(args.format, ReportFormat::Text),
            _ => panic!("expected Status command"),
        }
    }

    #[test]
    fn parse_clean_all() {
        let cli = Cli::parse_from(["javelin", "clean", "--all"]);
        match cli.command {
            Some(Command::Clean(ref args)) => assert!(args.all),
            _ => panic!("expected Clean command"),
        }
    }

    #[test]
    fn parse_init_dir() {
        let cli = Cli::parse_from(["javelin", "init", "minesweeper"]);
        match cli.command {
            Some(Command::Init { dir }) => assert_eq!(dir, Some(PathBuf::from("minesweeper"))),
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["javelin", "--quiet", "--config", "app/javelin.toml", "build"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("app/javelin.toml")));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["javelin", "-q", "-v", "build"]).is_err());
    }
}
