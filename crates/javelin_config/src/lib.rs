//! Parsing and resolution of `javelin.toml` project configuration files.
//!
//! This crate reads the optional project configuration file, validates it,
//! and resolves it together with command-line overrides into a
//! [`ResolvedConfig`] holding absolute paths, so that nothing downstream
//! depends on the process working directory.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_project_root, load_config, load_config_from_str, load_or_default, CONFIG_FILE};
pub use resolve::{resolve, Overrides, ResolvedConfig};
pub use types::*;
