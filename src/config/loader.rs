// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{LearnbenchError, Result};

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: ConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for basic runner sanity (non-zero timeout, non-empty cargo bin).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the built-in
/// defaults instead of an error.
///
/// The desktop shell ships without a config file by default; only learners
/// who want to relocate content or tune the runner write one.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(?path, "no config file; using defaults");
        return Ok(ConfigFile::default());
    }
    load_and_validate(path)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if config.runner.timeout_secs == 0 {
        return Err(LearnbenchError::ConfigError(
            "runner.timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.runner.cargo_bin.trim().is_empty() {
        return Err(LearnbenchError::ConfigError(
            "runner.cargo_bin must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Learnbench.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `LEARNBENCH_CONFIG`).
/// - Look for a per-user config directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Learnbench.toml")
}
