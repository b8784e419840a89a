#![allow(dead_code)]

use learnbench::exercise::{Exercise, INCOMPLETE_SENTINEL, resource_path};

/// Builder for `Exercise` to simplify test setup.
pub struct ExerciseBuilder {
    id: String,
    code: String,
}

impl ExerciseBuilder {
    /// Start from an unfinished exercise skeleton (sentinel present).
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            code: format!(
                "// {id}\n{INCOMPLETE_SENTINEL}\nfn main() {{\n    println!(\"hello\");\n}}\n"
            ),
        }
    }

    /// Replace the source wholesale.
    pub fn code(mut self, code: &str) -> Self {
        self.code = code.to_string();
        self
    }

    /// Strip the "not done" sentinel, leaving a finished buffer.
    pub fn complete(mut self) -> Self {
        self.code = self
            .code
            .lines()
            .filter(|line| !line.contains(INCOMPLETE_SENTINEL))
            .collect::<Vec<_>>()
            .join("\n");
        self
    }

    pub fn build(self) -> Exercise {
        Exercise {
            path: resource_path(&self.id),
            id: self.id,
            original_code: self.code,
        }
    }
}

/// A small curriculum manifest covering two modules.
pub fn sample_manifest_json() -> &'static str {
    r#"{
      "modules": [
        {
          "id": "basics",
          "title": "Basics",
          "lessons": [
            {
              "id": "variables",
              "title": "Variables",
              "micro_lessons": [
                {
                  "title": "Bindings",
                  "content_file": "lessons/variables/bindings.html",
                  "exercises": ["variables1", "variables2"]
                },
                {
                  "title": "Mutability",
                  "content_file": "lessons/variables/mutability.html"
                }
              ]
            }
          ]
        },
        {
          "id": "ownership",
          "title": "Ownership",
          "lessons": [
            {
              "id": "move_semantics",
              "title": "Move semantics",
              "micro_lessons": [
                {
                  "title": "Moves",
                  "content_file": "lessons/move_semantics/moves.html",
                  "exercises": ["move_semantics1"]
                }
              ]
            }
          ]
        }
      ]
    }"#
}
