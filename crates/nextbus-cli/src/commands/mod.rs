//! CLI subcommands.

pub mod cache;
pub mod config;
pub mod routes;
pub mod schedule;

use std::path::{Path, PathBuf};

use nextbus_core::{HttpTransport, NextbusConfig, TimetableService};
use tracing::debug;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nextbus")
        .join("config.json")
}

/// Resolve the config path from the `--config` flag or the default.
pub fn config_path(flag: Option<&str>) -> PathBuf {
    flag.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<NextbusConfig> {
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(NextbusConfig::from_file(path)?)
    } else {
        debug!("No configuration at {}, using defaults", path.display());
        Ok(NextbusConfig::default())
    }
}

/// Build the timetable service for the given `--config` flag.
pub fn build_service(flag: Option<&str>) -> anyhow::Result<TimetableService<HttpTransport>> {
    let config = load_config(&config_path(flag))?;
    Ok(TimetableService::from_config(&config)?)
}
