//! Configuration loader
//!
//! Loads the portfolio configuration from a TOML file.
//!
//! ## Loading Strategy
//! 1. `STAYSYNC_CONFIG` environment variable, when set, names the file
//! 2. Otherwise probes `./staysync.toml`, `./config.toml`, and the same
//!    names one directory up

use std::path::{Path, PathBuf};

use staysync_domain::{PortfolioConfig, Result, StaySyncError};

const CONFIG_ENV_VAR: &str = "STAYSYNC_CONFIG";

const PROBE_PATHS: [&str; 4] =
    ["staysync.toml", "config.toml", "../staysync.toml", "../config.toml"];

/// Load configuration with the automatic fallback strategy.
///
/// # Errors
/// Returns `StaySyncError::Config` when no config file is found, the file is
/// invalid TOML, or validation fails.
pub fn load() -> Result<PortfolioConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        tracing::info!(path, "loading configuration from {CONFIG_ENV_VAR}");
        return load_from_file(Path::new(&path));
    }

    let probed = probe_config_paths().ok_or_else(|| {
        StaySyncError::Config("no config file found in any of the standard locations".to_string())
    })?;
    load_from_file(&probed)
}

/// Load and validate configuration from a specific file.
///
/// # Errors
/// Returns `StaySyncError::Config` when the file is missing, unreadable,
/// invalid TOML, or fails validation.
pub fn load_from_file(path: &Path) -> Result<PortfolioConfig> {
    if !path.exists() {
        return Err(StaySyncError::Config(format!("config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| StaySyncError::Config(format!("failed to read config file: {e}")))?;
    let config: PortfolioConfig = toml::from_str(&contents)
        .map_err(|e| StaySyncError::Config(format!("invalid config file: {e}")))?;

    config.validate()?;
    Ok(config)
}

fn probe_config_paths() -> Option<PathBuf> {
    PROBE_PATHS.iter().map(PathBuf::from).find(|candidate| candidate.exists())
}
