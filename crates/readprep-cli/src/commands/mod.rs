//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod convert;
pub mod prompt;
pub mod serve;

use std::path::PathBuf;

use anyhow::Context as _;
use readprep_core::ReadprepConfig;
use tracing::debug;

/// `<config dir>/readprep/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("readprep")
        .join("config.json")
}

/// Resolve the configuration file in use: the `--config` path if given,
/// otherwise the default location.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration without environment overrides.
///
/// An explicit path must exist; the default path falls back to defaults.
pub fn load_file_config(config_path: Option<&str>) -> anyhow::Result<ReadprepConfig> {
    let path = config_file(config_path);
    if config_path.is_some() || path.exists() {
        debug!("Loading config from {}", path.display());
        return ReadprepConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }
    Ok(ReadprepConfig::default())
}

/// Load configuration and apply environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ReadprepConfig> {
    Ok(load_file_config(config_path)?.apply_env())
}
