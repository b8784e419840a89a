// src/progress/mod.rs

//! Learner progress persistence (SQLite via `rusqlite`).
//!
//! Rows are keyed by opaque lesson/exercise ids. Timestamps are stored as
//! ISO-8601 text so rows stay readable with any sqlite tooling.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS lesson_progress (
    lesson_id TEXT PRIMARY KEY,
    status TEXT NOT NULL DEFAULT 'not_started',
    current_micro INTEGER NOT NULL DEFAULT 0,
    last_viewed TEXT,
    completed_at TEXT
);
CREATE TABLE IF NOT EXISTS exercise_progress (
    exercise_id TEXT PRIMARY KEY,
    status TEXT NOT NULL DEFAULT 'not_started',
    attempts INTEGER NOT NULL DEFAULT 0,
    last_code TEXT,
    completed_at TEXT
);
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT
);
";

/// Progress state of a lesson or exercise row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }

    fn from_db(s: &str) -> Self {
        match s {
            "in_progress" => ProgressStatus::InProgress,
            "completed" => ProgressStatus::Completed,
            _ => ProgressStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgress {
    pub lesson_id: String,
    pub status: ProgressStatus,
    pub current_micro: i64,
    pub last_viewed: Option<String>,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseProgress {
    pub exercise_id: String,
    pub status: ProgressStatus,
    pub attempts: i64,
    pub last_code: Option<String>,
    pub completed_at: Option<String>,
}

/// Completed-row counts for the overall progress display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    pub lessons_completed: i64,
    pub exercises_completed: i64,
}

/// The two progress writes the session performs mid-run.
///
/// Split out as a trait so the session runtime can be tested without a
/// database.
pub trait ProgressSink: Send {
    /// Save the learner's draft before a run.
    fn record_attempt(&mut self, exercise_id: &str, code: &str) -> Result<()>;

    /// Persist the completed solution.
    fn record_completion(&mut self, exercise_id: &str, code: &str) -> Result<()>;
}

/// SQLite-backed progress store.
pub struct ProgressStore {
    conn: Connection,
}

impl ProgressStore {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    // ---- lessons -------------------------------------------------------

    /// Record that a lesson page was viewed. The stored micro index only
    /// ever grows.
    pub fn mark_lesson_viewed(&self, lesson_id: &str, micro_index: i64) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO lesson_progress (lesson_id, status, current_micro, last_viewed)
             VALUES (?1, 'in_progress', ?2, ?3)
             ON CONFLICT(lesson_id) DO UPDATE SET
               current_micro = MAX(current_micro, ?2),
               last_viewed = ?3",
            params![lesson_id, micro_index, now],
        )?;
        Ok(())
    }

    pub fn mark_lesson_completed(&self, lesson_id: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO lesson_progress (lesson_id, status, completed_at, last_viewed)
             VALUES (?1, 'completed', ?2, ?2)
             ON CONFLICT(lesson_id) DO UPDATE SET
               status = 'completed',
               completed_at = ?2,
               last_viewed = ?2",
            params![lesson_id, now],
        )?;
        Ok(())
    }

    pub fn lesson(&self, lesson_id: &str) -> Result<Option<LessonProgress>> {
        let row = self
            .conn
            .query_row(
                "SELECT lesson_id, status, current_micro, last_viewed, completed_at
                 FROM lesson_progress WHERE lesson_id = ?1",
                params![lesson_id],
                lesson_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn lessons(&self) -> Result<Vec<LessonProgress>> {
        let mut stmt = self.conn.prepare(
            "SELECT lesson_id, status, current_micro, last_viewed, completed_at
             FROM lesson_progress ORDER BY lesson_id",
        )?;
        let rows = stmt.query_map([], lesson_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Most recently viewed lesson, if any.
    pub fn last_viewed_lesson(&self) -> Result<Option<String>> {
        let row = self
            .conn
            .query_row(
                "SELECT lesson_id FROM lesson_progress ORDER BY last_viewed DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row)
    }

    // ---- exercises -----------------------------------------------------

    /// Save a draft and bump the attempt counter. A completed exercise keeps
    /// its status; re-running it only refreshes the draft.
    pub fn record_exercise_attempt(&self, exercise_id: &str, code: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO exercise_progress (exercise_id, status, attempts, last_code)
             VALUES (?1, 'in_progress', 1, ?2)
             ON CONFLICT(exercise_id) DO UPDATE SET
               attempts = attempts + 1,
               last_code = ?2",
            params![exercise_id, code],
        )?;
        Ok(())
    }

    pub fn record_exercise_completion(&self, exercise_id: &str, code: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO exercise_progress (exercise_id, status, last_code, completed_at)
             VALUES (?1, 'completed', ?2, ?3)
             ON CONFLICT(exercise_id) DO UPDATE SET
               status = 'completed',
               last_code = ?2,
               completed_at = ?3",
            params![exercise_id, code, now],
        )?;
        Ok(())
    }

    pub fn exercise(&self, exercise_id: &str) -> Result<Option<ExerciseProgress>> {
        let row = self
            .conn
            .query_row(
                "SELECT exercise_id, status, attempts, last_code, completed_at
                 FROM exercise_progress WHERE exercise_id = ?1",
                params![exercise_id],
                exercise_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn exercises(&self) -> Result<Vec<ExerciseProgress>> {
        let mut stmt = self.conn.prepare(
            "SELECT exercise_id, status, attempts, last_code, completed_at
             FROM exercise_progress ORDER BY exercise_id",
        )?;
        let rows = stmt.query_map([], exercise_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Discard the saved draft for an exercise, keeping attempts and status.
    pub fn clear_draft(&self, exercise_id: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE exercise_progress SET last_code = NULL WHERE exercise_id = ?1",
            params![exercise_id],
        )?;
        Ok(())
    }

    // ---- summary / settings -------------------------------------------

    pub fn summary(&self) -> Result<ProgressSummary> {
        let lessons_completed = self.conn.query_row(
            "SELECT COUNT(*) FROM lesson_progress WHERE status = 'completed'",
            [],
            |row| row.get(0),
        )?;
        let exercises_completed = self.conn.query_row(
            "SELECT COUNT(*) FROM exercise_progress WHERE status = 'completed'",
            [],
            |row| row.get(0),
        )?;
        Ok(ProgressSummary {
            lessons_completed,
            exercises_completed,
        })
    }

    pub fn setting(&self, key: &str) -> Result<Option<String>> {
        let row = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

impl ProgressSink for ProgressStore {
    fn record_attempt(&mut self, exercise_id: &str, code: &str) -> Result<()> {
        self.record_exercise_attempt(exercise_id, code)
    }

    fn record_completion(&mut self, exercise_id: &str, code: &str) -> Result<()> {
        self.record_exercise_completion(exercise_id, code)
    }
}

fn lesson_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LessonProgress> {
    let status: String = row.get(1)?;
    Ok(LessonProgress {
        lesson_id: row.get(0)?,
        status: ProgressStatus::from_db(&status),
        current_micro: row.get(2)?,
        last_viewed: row.get(3)?,
        completed_at: row.get(4)?,
    })
}

fn exercise_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExerciseProgress> {
    let status: String = row.get(1)?;
    Ok(ExerciseProgress {
        exercise_id: row.get(0)?,
        status: ProgressStatus::from_db(&status),
        attempts: row.get(2)?,
        last_code: row.get(3)?,
        completed_at: row.get(4)?,
    })
}
