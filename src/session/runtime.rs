// src/session/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::progress::ProgressSink;
use crate::runner::ToolchainBackend;

use super::core::SessionCore;
use super::handlers::SessionCommand;
use super::{SessionEvent, UiUpdate};

/// Drives the session core in response to `SessionEvent`s, and delegates
/// job execution to a `ToolchainBackend` and persistence to a
/// `ProgressSink`.
///
/// This is a pure IO shell around `SessionCore`, which contains all the
/// session semantics. This struct handles async IO: reading events from
/// channels, dispatching jobs, writing progress records and forwarding
/// console updates.
pub struct SessionRuntime<B: ToolchainBackend> {
    core: SessionCore,
    event_rx: mpsc::Receiver<SessionEvent>,
    backend: B,
    progress: Option<Box<dyn ProgressSink>>,
    ui_tx: mpsc::Sender<UiUpdate>,
}

impl<B: ToolchainBackend> fmt::Debug for SessionRuntime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRuntime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: ToolchainBackend> SessionRuntime<B> {
    pub fn new(
        core: SessionCore,
        event_rx: mpsc::Receiver<SessionEvent>,
        backend: B,
        progress: Option<Box<dyn ProgressSink>>,
        ui_tx: mpsc::Sender<UiUpdate>,
    ) -> Self {
        Self {
            core,
            event_rx,
            backend,
            progress,
            ui_tx,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `SessionEvent`s from `event_rx`.
    /// - Feeds them into the core session.
    /// - Executes commands returned by the core (dispatch, persist, render).
    pub async fn run(mut self) -> Result<()> {
        info!("session runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("session event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "session received event");

            // Feed the event into the pure core and get commands back.
            let step = self.core.step(event);

            // Execute the commands.
            for command in step.commands {
                self.execute_command(command).await?;
            }

            // If the core says to stop, break out of the loop.
            if !step.keep_running {
                info!("core requested exit; stopping session runtime");
                break;
            }
        }

        info!("session runtime exiting");
        Ok(())
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Dispatch(job) => {
                let job_id = job.id.clone();
                if let Err(err) = self.backend.dispatch(job).await {
                    warn!(job = %job_id, error = %err, "dispatch failed; tearing job down");

                    // Feed the failure straight back into the core so the
                    // session returns to idle without waiting for events.
                    let step = self.core.step(SessionEvent::DispatchFailed {
                        job: job_id,
                        message: err.to_string(),
                    });
                    for command in step.commands {
                        self.forward_ui(command).await;
                    }
                }
            }
            SessionCommand::Cancel(job) => {
                if let Err(err) = self.backend.cancel(job).await {
                    warn!(error = %err, "cancel request failed");
                }
            }
            SessionCommand::RecordAttempt { exercise_id, code } => {
                if let Some(progress) = &mut self.progress {
                    if let Err(err) = progress.record_attempt(&exercise_id, &code) {
                        warn!(exercise = %exercise_id, error = %err, "failed to save attempt");
                    }
                }
            }
            SessionCommand::RecordCompletion { exercise_id, code } => {
                if let Some(progress) = &mut self.progress {
                    if let Err(err) = progress.record_completion(&exercise_id, &code) {
                        warn!(exercise = %exercise_id, error = %err, "failed to save completion");
                    }
                }
            }
            other => self.forward_ui(other).await,
        }
        Ok(())
    }

    /// Forward a render command to the console surface.
    ///
    /// A closed UI channel is not an error: the surface may have gone away
    /// while a job was still producing output.
    async fn forward_ui(&mut self, command: SessionCommand) {
        let update = match command {
            SessionCommand::AppendOutput(line) => UiUpdate::Append(line),
            SessionCommand::ClearOutput => UiUpdate::Clear,
            SessionCommand::SetStatus(status) => UiUpdate::Status(status),
            SessionCommand::Notify(notice) => UiUpdate::Notice(notice),
            other => {
                warn!(?other, "unexpected non-render command; dropping");
                return;
            }
        };
        let _ = self.ui_tx.send(update).await;
    }
}
