// src/session/handlers.rs

//! Event handling logic for the core session.

use tracing::debug;

use crate::exercise;
use crate::runner::{JobId, JobSpec, RunMode, RunnerEvent};

use super::core::{ActiveJob, SessionCore};
use super::{RunStatus, SessionNotice, StreamKind};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Hand this job to the toolchain backend.
    Dispatch(JobSpec),
    /// Kill this job's process at the toolchain backend.
    Cancel(JobId),
    /// Save the learner's draft before a run.
    RecordAttempt { exercise_id: String, code: String },
    /// Persist the completed solution.
    RecordCompletion { exercise_id: String, code: String },
    /// Append a line to the console surface.
    AppendOutput(super::OutputLine),
    /// Reset the console surface.
    ClearOutput,
    /// Update the status line.
    SetStatus(RunStatus),
    /// Tell dependent UI surfaces to refresh.
    Notify(SessionNotice),
}

/// Decision returned by the core after handling a single `SessionEvent`.
#[derive(Debug, Clone)]
pub struct SessionStep {
    /// Commands the IO shell should execute (dispatch, persist, render).
    pub commands: Vec<SessionCommand>,
    /// Whether the outer session loop should keep running.
    pub keep_running: bool,
}

impl SessionStep {
    pub(crate) fn noop() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }
}

/// Handle a run trigger.
///
/// - A request while a job is active is ignored outright: no second
///   dispatch, no output clear (there is no queueing).
/// - An empty buffer (after trimming) is rejected without dispatching.
/// - Otherwise the transcript is reset, a fresh job id is generated, the
///   session enters the running state and the job goes to the backend. With
///   an exercise loaded, the draft is saved as an attempt first.
pub fn handle_run_request(core: &mut SessionCore, mode: RunMode, code: String) -> SessionStep {
    let mut commands = Vec::new();

    if core.active.is_some() {
        debug!("run requested while a job is active; ignoring");
        return SessionStep {
            commands,
            keep_running: true,
        };
    }

    core.buffer = code;
    if core.buffer.trim().is_empty() {
        core.set_status(&mut commands, RunStatus::NoCode);
        return SessionStep {
            commands,
            keep_running: true,
        };
    }

    core.transcript.clear();
    commands.push(SessionCommand::ClearOutput);

    let job = JobSpec {
        id: JobId::generate(),
        mode,
        code: core.buffer.trim().to_string(),
    };
    core.active = Some(ActiveJob {
        id: job.id.clone(),
        mode,
    });

    core.set_status(&mut commands, RunStatus::Compiling);
    core.append(
        &mut commands,
        StreamKind::Info,
        format!("$ cargo {}", mode.cargo_subcommand()),
    );
    core.append(&mut commands, StreamKind::Stdout, "");

    if let Some(ex) = &core.exercise {
        commands.push(SessionCommand::RecordAttempt {
            exercise_id: ex.id.clone(),
            code: core.buffer.clone(),
        });
    }
    commands.push(SessionCommand::Dispatch(job));

    SessionStep {
        commands,
        keep_running: true,
    }
}

/// Handle an event from the toolchain backend.
///
/// Events are correlated by job id: anything not carrying the active job's
/// id belongs to a superseded or cancelled run and is dropped without any
/// state change.
pub fn handle_runner_event(core: &mut SessionCore, event: RunnerEvent) -> SessionStep {
    let mut commands = Vec::new();

    let Some(active_id) = core.active.as_ref().map(|a| a.id.clone()) else {
        debug!(job = %event.job(), "runner event with no active job; ignoring");
        return SessionStep {
            commands,
            keep_running: true,
        };
    };
    if *event.job() != active_id {
        debug!(
            job = %event.job(),
            active = %active_id,
            "runner event for a stale job; ignoring"
        );
        return SessionStep {
            commands,
            keep_running: true,
        };
    }

    match event {
        RunnerEvent::StdoutLine { line, .. } => {
            core.append(&mut commands, StreamKind::Stdout, line);
        }
        RunnerEvent::StderrLine { line, .. } => {
            core.append(&mut commands, StreamKind::Stderr, line);
        }
        RunnerEvent::Completed {
            exit_code,
            duration_ms,
            ..
        } => {
            let success = exit_code == 0;

            if success {
                // Reconcile: a successful run of a finished buffer marks the
                // exercise as completed.
                let completed_exercise = core
                    .exercise
                    .as_ref()
                    .filter(|_| exercise::is_complete(&core.buffer))
                    .map(|ex| ex.id.clone());

                core.append(&mut commands, StreamKind::Stdout, "");
                core.append(
                    &mut commands,
                    StreamKind::Success,
                    format!("✓ Process exited with code 0 ({duration_ms}ms)"),
                );

                if let Some(exercise_id) = completed_exercise {
                    commands.push(SessionCommand::RecordCompletion {
                        exercise_id: exercise_id.clone(),
                        code: core.buffer.clone(),
                    });
                    commands.push(SessionCommand::Notify(SessionNotice::ExerciseCompleted {
                        exercise_id,
                    }));
                }

                core.set_status(&mut commands, RunStatus::Completed { duration_ms });
            } else {
                core.append(&mut commands, StreamKind::Stdout, "");
                core.append(
                    &mut commands,
                    StreamKind::Error,
                    format!("✗ Process exited with code {exit_code} ({duration_ms}ms)"),
                );
                core.set_status(&mut commands, RunStatus::Failed { exit_code });
            }

            // Clear the active job unconditionally.
            core.active = None;
        }
    }

    SessionStep {
        commands,
        keep_running: true,
    }
}

/// Handle the clear affordance.
pub fn handle_clear_request(core: &mut SessionCore) -> SessionStep {
    core.transcript.clear();
    SessionStep {
        commands: vec![SessionCommand::ClearOutput],
        keep_running: true,
    }
}

/// Handle an explicit cancel request.
///
/// The active job (if any) is killed at the backend and the session returns
/// to idle immediately; late events from the cancelled instance are then
/// dropped by id mismatch.
pub fn handle_cancel_request(core: &mut SessionCore) -> SessionStep {
    let mut commands = Vec::new();

    let Some(active) = core.active.take() else {
        debug!("cancel requested with no active job; ignoring");
        return SessionStep {
            commands,
            keep_running: true,
        };
    };

    commands.push(SessionCommand::Cancel(active.id.clone()));
    core.append(&mut commands, StreamKind::Info, "Run cancelled");
    core.set_status(&mut commands, RunStatus::Cancelled);

    SessionStep {
        commands,
        keep_running: true,
    }
}

/// Handle a failed dispatch call.
///
/// The job is torn down immediately without waiting for any event: state
/// reset to idle, error line appended, status set to "failed to start".
pub fn handle_dispatch_failure(
    core: &mut SessionCore,
    job: JobId,
    message: String,
) -> SessionStep {
    let mut commands = Vec::new();

    if core.active.as_ref().map(|a| &a.id) != Some(&job) {
        debug!(job = %job, "dispatch failure for a job that is not active; ignoring");
        return SessionStep {
            commands,
            keep_running: true,
        };
    }

    core.active = None;
    core.append(&mut commands, StreamKind::Error, format!("Error: {message}"));
    core.set_status(&mut commands, RunStatus::DispatchFailed);

    SessionStep {
        commands,
        keep_running: true,
    }
}
