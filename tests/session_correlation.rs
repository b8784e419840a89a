mod common;

use crate::common::{
    appended_texts, init_tracing, settle_updates, start_session, wait_for_dispatch,
    wait_for_dispatch_count,
};

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::timeout;

use learnbench::errors::{LearnbenchError, Result as LbResult};
use learnbench::runner::{JobId, JobSpec, RunMode, RunnerEvent, ToolchainBackend};
use learnbench::session::{RunStatus, SessionEvent, UiUpdate};
use learnbench_test_utils::fake_toolchain::RecordingToolchain;

type TestResult = Result<(), Box<dyn Error>>;

fn recording_backend() -> (
    RecordingToolchain,
    Arc<Mutex<Vec<JobSpec>>>,
    Arc<Mutex<Vec<JobId>>>,
) {
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let cancelled = Arc::new(Mutex::new(Vec::new()));
    let backend = RecordingToolchain::new(Arc::clone(&dispatched), Arc::clone(&cancelled));
    (backend, dispatched, cancelled)
}

fn statuses(updates: &[UiUpdate]) -> Vec<RunStatus> {
    updates
        .iter()
        .filter_map(|u| match u {
            UiUpdate::Status(status) => Some(*status),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn stale_events_are_ignored_and_matching_events_applied() -> TestResult {
    init_tracing();

    let (backend, dispatched, _) = recording_backend();
    let mut h = start_session(backend, None);

    h.tx.send(SessionEvent::RunRequested {
        mode: RunMode::Run,
        code: "fn main() {}".to_string(),
    })
    .await?;
    let job = wait_for_dispatch(&dispatched).await;

    // Drain the dispatch prologue (clear, status, prompt lines).
    let prologue = settle_updates(&mut h.ui_rx).await;
    assert_eq!(statuses(&prologue), vec![RunStatus::Compiling]);

    // A line tagged with a stale job id is dropped on the floor; the line
    // tagged with the active id is appended.
    h.tx.send(SessionEvent::Runner(RunnerEvent::StdoutLine {
        job: JobId::from("job-0"),
        line: "stale output".to_string(),
    }))
    .await?;
    h.tx.send(SessionEvent::Runner(RunnerEvent::StdoutLine {
        job: job.id.clone(),
        line: "Compiling...".to_string(),
    }))
    .await?;

    let updates = settle_updates(&mut h.ui_rx).await;
    assert_eq!(appended_texts(&updates), vec!["Compiling...".to_string()]);

    // A stale completion is ignored outright; the matching one finishes the
    // run.
    h.tx.send(SessionEvent::Runner(RunnerEvent::Completed {
        job: JobId::from("job-0"),
        exit_code: 1,
        duration_ms: 5,
    }))
    .await?;
    h.tx.send(SessionEvent::Runner(RunnerEvent::Completed {
        job: job.id.clone(),
        exit_code: 0,
        duration_ms: 842,
    }))
    .await?;

    let updates = settle_updates(&mut h.ui_rx).await;
    let seen = statuses(&updates);
    assert_eq!(seen, vec![RunStatus::Completed { duration_ms: 842 }]);
    assert_eq!(seen[0].text(), "Completed in 842ms");
    assert!(
        appended_texts(&updates)
            .iter()
            .any(|t| t == "✓ Process exited with code 0 (842ms)")
    );

    // The active job was cleared: a new run dispatches again.
    h.tx.send(SessionEvent::RunRequested {
        mode: RunMode::Test,
        code: "fn main() {}".to_string(),
    })
    .await?;
    wait_for_dispatch_count(&dispatched, 2).await;

    h.tx.send(SessionEvent::ShutdownRequested).await?;
    let _ = timeout(Duration::from_secs(1), h.runtime).await;

    Ok(())
}

#[tokio::test]
async fn run_request_while_active_has_no_observable_effect() -> TestResult {
    init_tracing();

    let (backend, dispatched, _) = recording_backend();
    let mut h = start_session(backend, None);

    h.tx.send(SessionEvent::RunRequested {
        mode: RunMode::Run,
        code: "fn main() {}".to_string(),
    })
    .await?;
    wait_for_dispatch(&dispatched).await;
    let first = settle_updates(&mut h.ui_rx).await;

    // Second trigger while the first job is still in flight.
    h.tx.send(SessionEvent::RunRequested {
        mode: RunMode::Run,
        code: "fn main() { panic!() }".to_string(),
    })
    .await?;
    let second = settle_updates(&mut h.ui_rx).await;

    assert_eq!(dispatched.lock().unwrap().len(), 1, "no second dispatch");
    assert!(second.is_empty(), "no output clear, no status change");
    assert!(
        first.iter().any(|u| matches!(u, UiUpdate::Clear)),
        "the first trigger did clear the transcript"
    );

    h.tx.send(SessionEvent::ShutdownRequested).await?;
    let _ = timeout(Duration::from_secs(1), h.runtime).await;

    Ok(())
}

#[tokio::test]
async fn empty_buffer_is_rejected_without_dispatch() -> TestResult {
    init_tracing();

    let (backend, dispatched, _) = recording_backend();
    let mut h = start_session(backend, None);

    h.tx.send(SessionEvent::RunRequested {
        mode: RunMode::Run,
        code: "   \n\t ".to_string(),
    })
    .await?;

    let updates = settle_updates(&mut h.ui_rx).await;
    assert_eq!(statuses(&updates), vec![RunStatus::NoCode]);
    assert_eq!(RunStatus::NoCode.text(), "No code to run");
    assert!(dispatched.lock().unwrap().is_empty());

    h.tx.send(SessionEvent::ShutdownRequested).await?;
    let _ = timeout(Duration::from_secs(1), h.runtime).await;

    Ok(())
}

#[tokio::test]
async fn nonzero_exit_yields_failed_status() -> TestResult {
    init_tracing();

    let (backend, dispatched, _) = recording_backend();
    let mut h = start_session(backend, None);

    h.tx.send(SessionEvent::RunRequested {
        mode: RunMode::Test,
        code: "fn main() {}".to_string(),
    })
    .await?;
    let job = wait_for_dispatch(&dispatched).await;
    let _ = settle_updates(&mut h.ui_rx).await;

    h.tx.send(SessionEvent::Runner(RunnerEvent::Completed {
        job: job.id.clone(),
        exit_code: 101,
        duration_ms: 12,
    }))
    .await?;

    let updates = settle_updates(&mut h.ui_rx).await;
    let seen = statuses(&updates);
    assert_eq!(seen, vec![RunStatus::Failed { exit_code: 101 }]);
    assert_eq!(seen[0].text(), "Failed (exit code 101)");
    assert!(
        appended_texts(&updates)
            .iter()
            .any(|t| t == "✗ Process exited with code 101 (12ms)")
    );

    h.tx.send(SessionEvent::ShutdownRequested).await?;
    let _ = timeout(Duration::from_secs(1), h.runtime).await;

    Ok(())
}

/// A backend whose dispatch call itself fails.
struct FailingToolchain {
    attempts: Arc<Mutex<usize>>,
}

impl ToolchainBackend for FailingToolchain {
    fn dispatch(
        &mut self,
        _job: JobSpec,
    ) -> Pin<Box<dyn Future<Output = LbResult<()>> + Send + '_>> {
        let attempts = Arc::clone(&self.attempts);
        Box::pin(async move {
            *attempts.lock().unwrap() += 1;
            Err(LearnbenchError::BackendUnavailable)
        })
    }

    fn cancel(&mut self, _job: JobId) -> Pin<Box<dyn Future<Output = LbResult<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}

#[tokio::test]
async fn dispatch_failure_tears_the_job_down() -> TestResult {
    init_tracing();

    let attempts = Arc::new(Mutex::new(0));
    let backend = FailingToolchain {
        attempts: Arc::clone(&attempts),
    };
    let mut h = start_session(backend, None);

    h.tx.send(SessionEvent::RunRequested {
        mode: RunMode::Run,
        code: "fn main() {}".to_string(),
    })
    .await?;

    let updates = settle_updates(&mut h.ui_rx).await;
    assert!(
        appended_texts(&updates)
            .iter()
            .any(|t| t.starts_with("Error: "))
    );
    assert!(statuses(&updates).contains(&RunStatus::DispatchFailed));
    assert_eq!(RunStatus::DispatchFailed.text(), "Failed to start");

    // The session is idle again: a new trigger reaches the backend.
    h.tx.send(SessionEvent::RunRequested {
        mode: RunMode::Run,
        code: "fn main() {}".to_string(),
    })
    .await?;
    let _ = settle_updates(&mut h.ui_rx).await;
    assert_eq!(*attempts.lock().unwrap(), 2);

    h.tx.send(SessionEvent::ShutdownRequested).await?;
    let _ = timeout(Duration::from_secs(1), h.runtime).await;

    Ok(())
}
