// src/exercise.rs

//! Exercise model and completion heuristics.

use std::sync::LazyLock;

use regex::Regex;

use crate::content::ContentStore;
use crate::errors::{LearnbenchError, Result};

/// Literal substring marking an exercise buffer as unfinished.
pub const INCOMPLETE_SENTINEL: &str = "// I AM NOT DONE";

/// An exercise as loaded from the content store.
///
/// `original_code` is the immutable pristine source, used as the reset
/// baseline; the learner's working copy lives in the editor buffer and the
/// progress store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub path: String,
    pub original_code: String,
}

impl Exercise {
    /// Load an exercise by id, mapping the id to its place in the exercise
    /// tree.
    pub fn load(store: &dyn ContentStore, id: &str) -> Result<Self> {
        let path = resource_path(id);
        let original_code = match store.read(&path) {
            Ok(code) => code,
            Err(LearnbenchError::ResourceNotFound(_)) => {
                return Err(LearnbenchError::ExerciseNotFound(id.to_string()));
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            id: id.to_string(),
            path,
            original_code,
        })
    }

    /// The hint embedded in the pristine source, if any.
    pub fn hint(&self) -> Option<String> {
        extract_hint(&self.original_code)
    }
}

/// Pure predicate: an exercise buffer counts as complete once the "not done"
/// sentinel has been removed.
pub fn is_complete(code: &str) -> bool {
    !code.contains(INCOMPLETE_SENTINEL)
}

/// Topic prefix to exercise-tree directory.
const TOPIC_DIRS: &[(&str, &str)] = &[
    ("intro", "00_intro"),
    ("variables", "01_variables"),
    ("functions", "02_functions"),
    ("if", "03_if"),
    ("primitive_types", "04_primitive_types"),
    ("vecs", "05_vecs"),
    ("move_semantics", "06_move_semantics"),
    ("structs", "07_structs"),
    ("enums", "08_enums"),
    ("strings", "09_strings"),
    ("modules", "10_modules"),
    ("hashmaps", "11_hashmaps"),
    ("options", "12_options"),
    ("error_handling", "13_error_handling"),
    ("generics", "14_generics"),
    ("traits", "15_traits"),
    ("lifetimes", "16_lifetimes"),
    ("tests", "17_tests"),
    ("iterators", "18_iterators"),
    ("smart_pointers", "19_smart_pointers"),
    ("threads", "20_threads"),
    ("macros", "21_macros"),
    ("clippy", "22_clippy"),
    ("conversions", "23_conversions"),
];

static EXERCISE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z_]+?)(\d*)$").expect("static exercise-name regex"));

/// Map an exercise id like `variables1` to its logical content-store path,
/// e.g. `exercises/01_variables/variables1.rs`.
///
/// Unrecognized names fall back to `00_intro`.
pub fn resource_path(exercise_id: &str) -> String {
    let file_name = if exercise_id.ends_with(".rs") {
        exercise_id.to_string()
    } else {
        format!("{exercise_id}.rs")
    };
    let base = file_name.trim_end_matches(".rs");

    let Some(caps) = EXERCISE_NAME.captures(base) else {
        return format!("exercises/00_intro/{file_name}");
    };
    let topic = caps[1].trim_end_matches('_');

    if let Some((_, dir)) = TOPIC_DIRS.iter().find(|(key, _)| *key == topic) {
        return format!("exercises/{dir}/{file_name}");
    }

    // `tests3` style names match exactly; something like `testsextra` still
    // maps by topic prefix.
    for (key, dir) in TOPIC_DIRS {
        if topic.starts_with(key) {
            return format!("exercises/{dir}/{file_name}");
        }
    }

    format!("exercises/00_intro/{file_name}")
}

static HINT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)//\s*hint:\s*(.+)").expect("static hint-line regex"));
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("static block-comment regex"));
static HINT_IN_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)hint[:\s]+(.+?)(?:\n|\*/)").expect("static block-hint regex"));

/// Pull the author's hint out of an exercise source.
///
/// A `// HINT: …` line comment wins; otherwise the first block comment is
/// searched for a `hint:` marker.
pub fn extract_hint(code: &str) -> Option<String> {
    if let Some(caps) = HINT_LINE.captures(code) {
        return Some(caps[1].trim().to_string());
    }

    let block = BLOCK_COMMENT.find(code)?;
    let caps = HINT_IN_BLOCK.captures(block.as_str())?;
    Some(caps[1].trim().to_string())
}
