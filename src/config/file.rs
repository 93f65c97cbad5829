//! Configuration file lookup
//!
//! Finds the configuration file and layers environment overrides on top.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{AppConfig, EnvConfig};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./sportmonks-probe.yaml",
    "./sportmonks-probe.yml",
    "./.sportmonks-probe.yaml",
    "~/.config/sportmonks-probe/config.yaml",
];

/// First existing file among the standard locations
pub fn find_config_file() -> Option<PathBuf> {
    CONFIG_LOCATIONS
        .iter()
        .map(|location| expand_path(location))
        .find(|path| path.exists())
}

/// Resolve the effective configuration.
///
/// The file comes from `explicit`, then `SPORTMONKS_PROBE_CONFIG`, then the
/// standard locations; environment overrides are applied on top. Returns the
/// file that was used, if any.
pub fn load_layered(
    explicit: Option<&Path>,
    env: &EnvConfig,
) -> Result<(AppConfig, Option<PathBuf>)> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| env.config_file.as_deref().map(expand_path))
        .or_else(find_config_file);

    let mut config = match &path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    env.apply_to(&mut config);
    config.validate()?;
    Ok((config, path))
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
