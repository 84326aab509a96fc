//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::{Path, PathBuf};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "javelin.toml";

/// Loads and validates a `javelin.toml` configuration from a project directory.
///
/// Reads `<project_dir>/javelin.toml`, parses it, and validates it.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Loads `javelin.toml` from `project_dir` if it exists, otherwise returns
/// the default configuration.
pub fn load_or_default(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    if project_dir.join(CONFIG_FILE).is_file() {
        load_config(project_dir)
    } else {
        Ok(ProjectConfig::default())
    }
}

/// Parses and validates a `javelin.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Walks up from `start` looking for the nearest directory containing `javelin.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Validates that configuration values are usable.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.build.jobs == Some(0) {
        return Err(ConfigError::ValidationError(
            "build.jobs must be at least 1".to_string(),
        ));
    }
    if config.build.source_extensions.is_empty() {
        return Err(ConfigError::ValidationError(
            "build.source_extensions must name at least one extension".to_string(),
        ));
    }
    if let Some(ext) = config
        .build
        .source_extensions
        .iter()
        .find(|ext| ext.is_empty() || ext.starts_with('.'))
    {
        return Err(ConfigError::ValidationError(format!(
            "invalid source extension '{ext}' (write extensions without the leading dot)"
        )));
    }
    if config.toolchain.javac.trim().is_empty() || config.toolchain.java.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "toolchain.javac and toolchain.java must not be empty".to_string(),
        ));
    }
    for (key, value) in [
        ("paths.source", &config.paths.source),
        ("paths.output", &config.paths.output),
        ("paths.cache", &config.paths.cache),
    ] {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!("{key} must not be empty")));
        }
    }
    Ok(())
}
