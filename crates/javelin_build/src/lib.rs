//! Incremental build pass for Java source trees.
//!
//! The [`Orchestrator`] walks the source tree, compiles only the files whose
//! content changed since their last successful compile, records the new
//! fingerprints, and reports a per-file outcome. The external compiler and
//! launcher sit behind the [`Compiler`] and [`Runner`] traits so the pass can
//! be driven by any toolchain, or by scripted fakes in tests.

#![warn(missing_docs)]

pub mod classpath;
pub mod discover;
pub mod error;
pub mod events;
pub mod launch;
pub mod orchestrator;
pub mod report;
pub mod toolchain;

pub use classpath::Classpath;
pub use discover::{discover_sources, Discovery, SourceFile};
pub use error::{BuildError, ClasspathError, CompileError, LaunchError};
pub use events::{BuildEvent, EventLog, EventSink};
pub use launch::{launch, LaunchOutcome};
pub use orchestrator::Orchestrator;
pub use report::{BuildReport, FileFailure, FileOutcome, FileResult, Unrecorded};
pub use toolchain::{Compiler, JavaLauncher, Javac, Runner};
