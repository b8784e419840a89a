// src/content/mod.rs

//! Lesson and exercise content access.
//!
//! Content paths are logical, forward-slash strings. Paths beginning with
//! `exercises/` resolve against the exercise tree; everything else resolves
//! against the lesson-content directory (where `lessons.json` and the
//! rendered lesson bodies live).

use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use crate::config::ContentSection;
use crate::errors::{LearnbenchError, Result};

pub mod manifest;
pub mod mock;

pub use manifest::{Curriculum, Lesson, MicroLesson, Module};
pub use mock::InMemoryContentStore;

/// Entry returned by [`ContentStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Abstract content source.
pub trait ContentStore: Send + Sync + Debug {
    /// Read a resource as UTF-8 text.
    fn read(&self, path: &str) -> Result<String>;

    /// List a resource directory, sorted by name.
    fn list(&self, dir: &str) -> Result<Vec<ResourceEntry>>;
}

/// Content store backed by directories on disk.
#[derive(Debug, Clone)]
pub struct DirContentStore {
    content_root: PathBuf,
    exercises_root: PathBuf,
}

impl DirContentStore {
    pub fn new(content_root: impl Into<PathBuf>, exercises_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            exercises_root: exercises_root.into(),
        }
    }

    pub fn from_config(cfg: &ContentSection) -> Self {
        Self::new(cfg.dir.clone(), cfg.exercises_dir.clone())
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let full = match path.strip_prefix("exercises/") {
            Some(rest) => self.exercises_root.join(rest),
            None => self.content_root.join(path),
        };

        if !full.exists() {
            return Err(LearnbenchError::ResourceNotFound(path.to_string()));
        }
        Ok(full)
    }
}

impl ContentStore for DirContentStore {
    fn read(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        let text = fs::read_to_string(&full)
            .with_context(|| format!("reading resource '{path}'"))
            .map_err(LearnbenchError::from)?;
        Ok(text)
    }

    fn list(&self, dir: &str) -> Result<Vec<ResourceEntry>> {
        let full = self.resolve(dir)?;
        if !full.is_dir() {
            return Err(LearnbenchError::ConfigError(format!(
                "not a directory: {dir}"
            )));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&full)
            .with_context(|| format!("reading resource dir '{dir}'"))
            .map_err(LearnbenchError::from)?
        {
            let entry = entry.map_err(LearnbenchError::from)?;
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push(ResourceEntry { name, is_dir });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
