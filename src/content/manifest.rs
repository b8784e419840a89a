// src/content/manifest.rs

//! Lesson manifest (`lessons.json`) model.
//!
//! The manifest describes the curriculum tree: modules contain lessons, a
//! lesson is split into micro-lessons (one content page each), and a
//! micro-lesson may reference exercises by id.

use serde::Deserialize;

use super::ContentStore;
use crate::errors::{LearnbenchError, Result};

/// Logical path of the manifest inside the content store.
pub const MANIFEST_PATH: &str = "lessons.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub micro_lessons: Vec<MicroLesson>,
}

/// One content page of a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct MicroLesson {
    pub title: String,
    /// Content-store path of the rendered body.
    pub content_file: String,
    /// Exercise ids attached to this page.
    #[serde(default)]
    pub exercises: Vec<String>,
}

impl Curriculum {
    pub fn from_json(text: &str) -> Result<Self> {
        let curriculum = serde_json::from_str(text)?;
        Ok(curriculum)
    }

    /// Load and parse the manifest from a content store.
    pub fn load(store: &dyn ContentStore) -> Result<Self> {
        Self::from_json(&store.read(MANIFEST_PATH)?)
    }

    /// Find a lesson anywhere in the module tree.
    pub fn find_lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .find(|l| l.id == lesson_id)
    }

    /// Like [`find_lesson`](Self::find_lesson), but a missing lesson is an
    /// error.
    pub fn lesson(&self, lesson_id: &str) -> Result<&Lesson> {
        self.find_lesson(lesson_id)
            .ok_or_else(|| LearnbenchError::LessonNotFound(lesson_id.to_string()))
    }

    /// Total number of lessons across all modules.
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

impl Lesson {
    /// The micro-lesson at `index`, if in range.
    pub fn micro(&self, index: usize) -> Option<&MicroLesson> {
        self.micro_lessons.get(index)
    }
}
