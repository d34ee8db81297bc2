//! Configuration management for the proxy bootstrap
//!
//! Settings come from an optional TOML file. Every key has a default, so a
//! VM without a config file runs with the published agent settings.

mod bootstrap;

pub use bootstrap::{AccessTokenSource, AgentSettings, BootstrapConfig, LabelSettings};

use crate::error::ConfigError;
use std::io;
use std::path::{Path, PathBuf};

/// System-wide config directory, `/etc` when the platform has none
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("workbench-bootstrap")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("bootstrap.toml")
}

/// Parse the config file at `path`, which must exist
pub fn load_config(path: &Path) -> Result<BootstrapConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Invalid(format!("cannot read {}: {}", path.display(), e)),
    })?;
    Ok(toml::from_str(&content)?)
}

/// Resolve the run's configuration.
///
/// An explicit path must exist. Without one, `fallback` is read when present
/// and defaults apply otherwise.
pub fn resolve_config(
    explicit: Option<&Path>,
    fallback: &Path,
) -> Result<BootstrapConfig, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None => match load_config(fallback) {
            Err(ConfigError::NotFound(_)) => Ok(BootstrapConfig::default()),
            other => other,
        },
    }
}
