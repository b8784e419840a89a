// src/config/mod.rs

//! Configuration model for `learnbench`.
//!
//! All sections are optional and have reasonable defaults, so a missing
//! config file simply means "run with defaults":
//!
//! ```toml
//! [content]
//! dir = "resources/content"
//! exercises_dir = "resources/exercises"
//!
//! [progress]
//! database = "learnbench-progress.db"
//!
//! [runner]
//! timeout_secs = 300
//! cargo_bin = "cargo"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::runner::RunnerLimits;

pub mod loader;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};

/// Top-level configuration as read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Content locations from `[content]`.
    #[serde(default)]
    pub content: ContentSection,

    /// Progress database location from `[progress]`.
    #[serde(default)]
    pub progress: ProgressSection,

    /// Execution limits from `[runner]`.
    #[serde(default)]
    pub runner: RunnerSection,
}

/// `[content]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentSection {
    /// Directory holding lesson bodies and `lessons.json`.
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,

    /// Directory holding the exercise tree (`00_intro/…`, `01_variables/…`).
    #[serde(default = "default_exercises_dir")]
    pub exercises_dir: PathBuf,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("resources/content")
}

fn default_exercises_dir() -> PathBuf {
    PathBuf::from("resources/exercises")
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            exercises_dir: default_exercises_dir(),
        }
    }
}

/// `[progress]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressSection {
    /// SQLite database file tracking learner progress.
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

fn default_database() -> PathBuf {
    PathBuf::from("learnbench-progress.db")
}

impl Default for ProgressSection {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Maximum seconds a job may run before it is killed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cargo binary used to build and run submitted code.
    #[serde(default = "default_cargo_bin")]
    pub cargo_bin: String,
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_cargo_bin() -> String {
    "cargo".to_string()
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            cargo_bin: default_cargo_bin(),
        }
    }
}

impl RunnerSection {
    /// Limits handed to the toolchain dispatcher.
    pub fn limits(&self) -> RunnerLimits {
        RunnerLimits {
            timeout: Duration::from_secs(self.timeout_secs),
            cargo_bin: self.cargo_bin.clone(),
        }
    }
}
