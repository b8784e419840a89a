// src/session/core.rs

//! Pure core session state machine.
//!
//! This module contains a synchronous, deterministic "core session" that
//! consumes [`SessionEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`session::runtime::SessionRuntime`) is
//! responsible for:
//! - reading events from channels
//! - handing jobs to the toolchain backend
//! - writing progress records
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, filesystem, or processes.

use crate::exercise::Exercise;
use crate::runner::{JobId, RunMode};

use super::handlers::{
    SessionCommand, SessionStep, handle_cancel_request, handle_clear_request,
    handle_dispatch_failure, handle_run_request, handle_runner_event,
};
use super::{OutputLine, RunStatus, SessionEvent, StreamKind};

/// The job currently in flight, as the session sees it.
#[derive(Debug, Clone)]
pub struct ActiveJob {
    pub id: JobId,
    pub mode: RunMode,
}

/// Pure core session state.
///
/// This owns:
/// - the active job (at most one)
/// - the loaded exercise, if any
/// - the buffer snapshot of the last run request
/// - the output transcript and status line
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct SessionCore {
    pub(crate) active: Option<ActiveJob>,
    pub(crate) exercise: Option<Exercise>,
    pub(crate) buffer: String,
    pub(crate) transcript: Vec<OutputLine>,
    pub(crate) status: RunStatus,
}

impl SessionCore {
    pub fn new() -> Self {
        Self {
            active: None,
            exercise: None,
            buffer: String::new(),
            transcript: Vec::new(),
            status: RunStatus::Idle,
        }
    }

    /// Whether a job is currently in flight.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Id of the job currently in flight, if any.
    pub fn active_job(&self) -> Option<&JobId> {
        self.active.as_ref().map(|a| &a.id)
    }

    /// Current status line state.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// The output transcript accumulated so far.
    pub fn transcript(&self) -> &[OutputLine] {
        &self.transcript
    }

    /// The loaded exercise, if any.
    pub fn exercise(&self) -> Option<&Exercise> {
        self.exercise.as_ref()
    }

    /// Handle a single session event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: SessionEvent) -> SessionStep {
        match event {
            SessionEvent::RunRequested { mode, code } => handle_run_request(self, mode, code),
            SessionEvent::ClearRequested => handle_clear_request(self),
            SessionEvent::CancelRequested => handle_cancel_request(self),
            SessionEvent::ExerciseOpened(exercise) => {
                self.exercise = Some(exercise);
                SessionStep::noop()
            }
            SessionEvent::ExerciseClosed => {
                self.exercise = None;
                SessionStep::noop()
            }
            SessionEvent::DispatchFailed { job, message } => {
                handle_dispatch_failure(self, job, message)
            }
            SessionEvent::Runner(event) => handle_runner_event(self, event),
            SessionEvent::ShutdownRequested => SessionStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    /// Append a transcript line and mirror it to the IO shell.
    pub(crate) fn append(
        &mut self,
        commands: &mut Vec<SessionCommand>,
        kind: StreamKind,
        text: impl Into<String>,
    ) {
        let line = OutputLine::new(kind, text);
        self.transcript.push(line.clone());
        commands.push(SessionCommand::AppendOutput(line));
    }

    /// Update the status line and mirror it to the IO shell.
    pub(crate) fn set_status(&mut self, commands: &mut Vec<SessionCommand>, status: RunStatus) {
        self.status = status;
        commands.push(SessionCommand::SetStatus(status));
    }
}

impl Default for SessionCore {
    fn default() -> Self {
        Self::new()
    }
}
