// src/runner/cargo.rs

//! Individual job process runner.

use std::process::Stdio;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::workspace::ScratchProject;
use super::{JobSpec, RunnerEvent, RunnerLimits};

/// Run a single job process, streaming stdout/stderr lines and emitting a
/// `Completed` event on exit.
///
/// - If the cancel channel fires, the child process is killed and **no**
///   `Completed` event is sent for that instance. This avoids confusing the
///   session with completions from superseded jobs.
/// - If the time limit elapses first, the child is killed, a stderr line
///   explains why, and a `Completed` with exit code -1 is emitted so the
///   session always returns to idle.
pub async fn run_job(
    job: JobSpec,
    events_tx: mpsc::Sender<RunnerEvent>,
    cancel_rx: oneshot::Receiver<()>,
    limits: RunnerLimits,
) {
    let job_id = job.id.clone();
    if let Err(err) = run_job_inner(job, &events_tx, cancel_rx, &limits).await {
        error!(job = %job_id, error = %err, "job execution error");
        let _ = events_tx
            .send(RunnerEvent::StderrLine {
                job: job_id.clone(),
                line: format!("error: {err:#}"),
            })
            .await;
        let _ = events_tx
            .send(RunnerEvent::Completed {
                job: job_id,
                exit_code: -1,
                duration_ms: 0,
            })
            .await;
    }
}

async fn run_job_inner(
    job: JobSpec,
    events_tx: &mpsc::Sender<RunnerEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
    limits: &RunnerLimits,
) -> Result<()> {
    info!(
        job = %job.id,
        mode = %job.mode,
        timeout_secs = limits.timeout.as_secs(),
        "starting job process"
    );

    let scratch = ScratchProject::create(&job.code, job.mode)?;
    let started = Instant::now();

    let mut cmd = Command::new(&limits.cargo_bin);
    cmd.arg(job.mode.cargo_subcommand())
        .current_dir(scratch.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().with_context(|| {
        format!(
            "spawning '{} {}' for job '{}'",
            limits.cargo_bin,
            job.mode.cargo_subcommand(),
            job.id
        )
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    if let Some(stdout) = stdout {
        let tx = events_tx.clone();
        let id = job.id.clone();
        tokio::spawn(async move {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();

            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(RunnerEvent::StdoutLine { job: id.clone(), line }).await.is_err() {
                    break;
                }
            }
        });
    }

    if let Some(stderr) = stderr {
        let tx = events_tx.clone();
        let id = job.id.clone();
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();

            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(RunnerEvent::StderrLine { job: id.clone(), line }).await.is_err() {
                    break;
                }
            }
        });
    }

    let deadline = tokio::time::sleep(limits.timeout);
    tokio::pin!(deadline);

    // Either the process exits on its own (normal case), the time limit
    // elapses, or we receive a cancellation request from the dispatcher.
    tokio::select! {
        status_res = child.wait() => {
            let status = status_res
                .with_context(|| format!("waiting for process of job '{}'", job.id))?;

            let exit_code = status.code().unwrap_or(-1);
            let duration_ms = started.elapsed().as_millis() as u64;

            info!(
                job = %job.id,
                exit_code,
                duration_ms,
                success = status.success(),
                "job process exited"
            );

            events_tx
                .send(RunnerEvent::Completed {
                    job: job.id.clone(),
                    exit_code,
                    duration_ms,
                })
                .await
                .with_context(|| {
                    format!("sending Completed event for job '{}' to session", job.id)
                })?;
        }

        _ = &mut deadline => {
            warn!(
                job = %job.id,
                timeout_secs = limits.timeout.as_secs(),
                "job exceeded time limit; killing process"
            );
            if let Err(e) = child.kill().await {
                warn!(job = %job.id, error = %e, "failed to kill timed-out child process");
            }

            let duration_ms = started.elapsed().as_millis() as u64;
            let _ = events_tx
                .send(RunnerEvent::StderrLine {
                    job: job.id.clone(),
                    line: format!(
                        "process killed after exceeding the {}s time limit",
                        limits.timeout.as_secs()
                    ),
                })
                .await;

            events_tx
                .send(RunnerEvent::Completed {
                    job: job.id.clone(),
                    exit_code: -1,
                    duration_ms,
                })
                .await
                .with_context(|| {
                    format!("sending timeout Completed event for job '{}' to session", job.id)
                })?;
        }

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => {
                    info!(
                        job = %job.id,
                        "cancellation requested for running job instance; killing process"
                    );
                    if let Err(e) = child.kill().await {
                        warn!(
                            job = %job.id,
                            error = %e,
                            "failed to kill child process on cancellation"
                        );
                    }
                    // Do NOT send Completed for this cancelled instance.
                }
                Err(e) => {
                    debug!(
                        job = %job.id,
                        error = %e,
                        "cancel channel closed without explicit cancellation"
                    );
                    // Child will be killed on drop due to kill_on_drop(true).
                }
            }
        }
    }

    Ok(())
}
