// src/runner/dispatcher.rs

//! Dispatcher loop that manages the running job process.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::cargo::run_job;
use super::{JobId, JobSpec, RunnerEvent, RunnerLimits};

/// Messages accepted by the dispatcher loop.
#[derive(Debug)]
pub enum DispatcherMsg {
    /// Start running this job.
    Dispatch(JobSpec),
    /// Kill the given job's process if it is the live one.
    Cancel(JobId),
}

/// Handle for the currently-running job process.
///
/// - `cancel` is used by the dispatcher to request that the process be
///   stopped (explicit cancel, or supersession by a newer dispatch).
/// - `handle` is the Tokio task that is actually running the job.
struct ActiveJob {
    id: JobId,
    cancel: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

/// Spawn the background dispatcher loop.
///
/// The returned `mpsc::Sender<DispatcherMsg>` is what `CargoBackend` uses.
/// Each dispatched job runs in its own Tokio task, and **there will never be
/// more than one job process running at the same time**: a dispatch that
/// arrives while a previous job is still live cancels (kills) the previous
/// instance first. The session enforces one-job-at-a-time at its own level;
/// the dispatcher-side supersession covers explicit cancel-and-rerun flows.
pub fn spawn_dispatcher(
    events_tx: mpsc::Sender<RunnerEvent>,
    limits: RunnerLimits,
) -> mpsc::Sender<DispatcherMsg> {
    let (tx, mut rx) = mpsc::channel::<DispatcherMsg>(32);

    tokio::spawn(async move {
        info!("toolchain dispatcher started");

        let mut active: Option<ActiveJob> = None;

        while let Some(msg) = rx.recv().await {
            match msg {
                DispatcherMsg::Dispatch(job) => {
                    handle_dispatch(job, &mut active, &events_tx, &limits);
                }
                DispatcherMsg::Cancel(id) => {
                    cancel_active(&id, &mut active);
                }
            }
        }

        info!("toolchain dispatcher finished (channel closed)");
    });

    tx
}

fn handle_dispatch(
    job: JobSpec,
    active: &mut Option<ActiveJob>,
    events_tx: &mpsc::Sender<RunnerEvent>,
    limits: &RunnerLimits,
) {
    if let Some(existing) = active {
        if !existing.handle.is_finished() {
            info!(
                job = %job.id,
                previous = %existing.id,
                "dispatch supersedes a live job; cancelling previous instance"
            );
            send_cancel(existing);
        }
    }

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let id = job.id.clone();
    let tx = events_tx.clone();
    let limits = limits.clone();
    let spawn_id = id.clone();

    let handle = tokio::spawn(async move {
        run_job(job, tx, cancel_rx, limits).await;
        debug!(job = %spawn_id, "job runner future finished");
    });

    *active = Some(ActiveJob {
        id,
        cancel: Some(cancel_tx),
        handle,
    });
}

fn cancel_active(id: &JobId, active: &mut Option<ActiveJob>) {
    match active {
        Some(existing) if existing.id == *id => {
            info!(job = %id, "cancel requested; killing job process");
            send_cancel(existing);
        }
        _ => {
            debug!(job = %id, "cancel requested for a job that is not live; ignoring");
        }
    }
}

fn send_cancel(existing: &mut ActiveJob) {
    if let Some(cancel) = existing.cancel.take() {
        if cancel.send(()).is_err() {
            debug!(job = %existing.id, "job process already finished while cancelling");
        }
    } else {
        debug!(job = %existing.id, "no cancel sender present; job may already have been cancelled");
    }
}
