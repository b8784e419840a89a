// src/content/mock.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{ContentStore, ResourceEntry};
use crate::errors::{LearnbenchError, Result};

/// In-memory content store for tests.
///
/// Paths are stored verbatim; directory listings are derived from the
/// stored paths' first segment below the queried dir.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    files: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, path: impl Into<String>, contents: impl Into<String>) {
        let mut files = self.files.lock().unwrap();
        files.insert(path.into(), contents.into());
    }
}

impl ContentStore for InMemoryContentStore {
    fn read(&self, path: &str) -> Result<String> {
        let files = self.files.lock().unwrap();
        files
            .get(path)
            .cloned()
            .ok_or_else(|| LearnbenchError::ResourceNotFound(path.to_string()))
    }

    fn list(&self, dir: &str) -> Result<Vec<ResourceEntry>> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let files = self.files.lock().unwrap();

        let mut entries: Vec<ResourceEntry> = Vec::new();
        for path in files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            let (name, is_dir) = match rest.split_once('/') {
                Some((first, _)) => (first.to_string(), true),
                None => (rest.to_string(), false),
            };
            if !entries.iter().any(|e| e.name == name) {
                entries.push(ResourceEntry { name, is_dir });
            }
        }

        if entries.is_empty() {
            return Err(LearnbenchError::ResourceNotFound(dir.to_string()));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
