use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use learnbench::errors::Result;
use learnbench::runner::{JobId, JobSpec, RunnerEvent, ToolchainBackend};

/// A fake toolchain that:
/// - records which jobs were dispatched and which were cancelled
/// - never emits any events on its own (jobs stay in flight forever).
///
/// Useful for exercising the session's one-job-at-a-time and cancellation
/// behaviour; tests feed `RunnerEvent`s into the session themselves.
pub struct RecordingToolchain {
    dispatched: Arc<Mutex<Vec<JobSpec>>>,
    cancelled: Arc<Mutex<Vec<JobId>>>,
}

impl RecordingToolchain {
    pub fn new(
        dispatched: Arc<Mutex<Vec<JobSpec>>>,
        cancelled: Arc<Mutex<Vec<JobId>>>,
    ) -> Self {
        Self {
            dispatched,
            cancelled,
        }
    }
}

impl ToolchainBackend for RecordingToolchain {
    fn dispatch(&mut self, job: JobSpec) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            dispatched.lock().unwrap().push(job);
            Ok(())
        })
    }

    fn cancel(&mut self, job: JobId) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let cancelled = Arc::clone(&self.cancelled);

        Box::pin(async move {
            cancelled.lock().unwrap().push(job);
            Ok(())
        })
    }
}

/// One scripted backend reaction, replayed with the actual job id at
/// dispatch time.
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    Stdout(String),
    Stderr(String),
    Complete { exit_code: i32, duration_ms: u64 },
}

impl ScriptedStep {
    fn into_event(self, job: JobId) -> RunnerEvent {
        match self {
            ScriptedStep::Stdout(line) => RunnerEvent::StdoutLine { job, line },
            ScriptedStep::Stderr(line) => RunnerEvent::StderrLine { job, line },
            ScriptedStep::Complete {
                exit_code,
                duration_ms,
            } => RunnerEvent::Completed {
                job,
                exit_code,
                duration_ms,
            },
        }
    }
}

/// A fake toolchain that emits a fixed event script for every dispatched
/// job, tagged with that job's id.
pub struct ScriptedToolchain {
    events_tx: mpsc::Sender<RunnerEvent>,
    script: Vec<ScriptedStep>,
    dispatched: Arc<Mutex<Vec<JobSpec>>>,
}

impl ScriptedToolchain {
    pub fn new(
        events_tx: mpsc::Sender<RunnerEvent>,
        script: Vec<ScriptedStep>,
        dispatched: Arc<Mutex<Vec<JobSpec>>>,
    ) -> Self {
        Self {
            events_tx,
            script,
            dispatched,
        }
    }
}

impl ToolchainBackend for ScriptedToolchain {
    fn dispatch(&mut self, job: JobSpec) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.events_tx.clone();
        let script = self.script.clone();
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            let id = job.id.clone();
            dispatched.lock().unwrap().push(job);

            // Replay in a background task so we don't block the session loop.
            tokio::spawn(async move {
                for step in script {
                    if tx.send(step.into_event(id.clone())).await.is_err() {
                        break;
                    }
                }
            });
            Ok(())
        })
    }

    fn cancel(&mut self, _job: JobId) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}
