// src/runner/mod.rs

//! Code execution layer.
//!
//! This module is responsible for actually running submitted code through the
//! host `cargo` toolchain and reporting back to the session via
//! [`RunnerEvent`]s:
//!
//! - [`workspace`] scaffolds a throwaway Cargo project per job.
//! - [`cargo`] handles one job process: spawning, line streaming, timeout and
//!   cancellation.
//! - [`dispatcher`] owns the dispatcher loop which enforces "at most one
//!   child process at a time".
//! - [`backend`] provides the `ToolchainBackend` trait and a concrete
//!   `CargoBackend` that the session uses in production, and which tests can
//!   replace with a fake implementation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod backend;
pub mod cargo;
pub mod dispatcher;
pub mod workspace;

pub use backend::{CargoBackend, ToolchainBackend};
pub use dispatcher::{DispatcherMsg, spawn_dispatcher};
pub use workspace::ScratchProject;

/// Identifier correlating one execution request/response cycle.
///
/// Generated fresh per run; events carrying a different id than the active
/// job are stale and must be ignored by the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Produce a probabilistically-unique job token.
    pub fn generate() -> Self {
        JobId(format!("job-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        JobId(s)
    }
}

/// How the submitted buffer is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Run,
    Test,
}

impl RunMode {
    /// Cargo subcommand used for this mode.
    pub fn cargo_subcommand(&self) -> &'static str {
        match self {
            RunMode::Run => "run",
            RunMode::Test => "test",
        }
    }

    /// File the submitted buffer is written to inside the scratch project.
    ///
    /// Test mode compiles the buffer as a library so `#[cfg(test)]` modules
    /// work without a `main`.
    pub fn source_file(&self) -> &'static str {
        match self {
            RunMode::Run => "main.rs",
            RunMode::Test => "lib.rs",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cargo_subcommand())
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "run" => Ok(RunMode::Run),
            "test" => Ok(RunMode::Test),
            other => Err(format!("invalid run mode: {other} (expected \"run\" or \"test\")")),
        }
    }
}

/// One execution request handed to the toolchain backend.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub id: JobId,
    pub mode: RunMode,
    pub code: String,
}

/// Events emitted by the toolchain backend, tagged with the job they belong
/// to.
///
/// Per job the backend emits zero or more line events followed by exactly one
/// `Completed`, unless the job is cancelled, in which case nothing further
/// is emitted for that instance.
#[derive(Debug, Clone)]
pub enum RunnerEvent {
    /// A line of the child's stdout arrived.
    StdoutLine { job: JobId, line: String },
    /// A line of the child's stderr arrived.
    StderrLine { job: JobId, line: String },
    /// The child exited (or was killed by the time limit).
    Completed {
        job: JobId,
        exit_code: i32,
        duration_ms: u64,
    },
}

impl RunnerEvent {
    /// The job this event belongs to.
    pub fn job(&self) -> &JobId {
        match self {
            RunnerEvent::StdoutLine { job, .. }
            | RunnerEvent::StderrLine { job, .. }
            | RunnerEvent::Completed { job, .. } => job,
        }
    }
}

/// Limits applied to every spawned job.
#[derive(Debug, Clone)]
pub struct RunnerLimits {
    /// Wall-clock budget before the child is killed.
    pub timeout: Duration,
    /// Binary invoked as `cargo` (overridable for tests).
    pub cargo_bin: String,
}

impl Default for RunnerLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            cargo_bin: "cargo".to_string(),
        }
    }
}
