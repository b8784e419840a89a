#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, fmt};

use learnbench::progress::ProgressSink;
use learnbench::runner::{JobSpec, ToolchainBackend};
use learnbench::session::{SessionCore, SessionEvent, SessionRuntime, UiUpdate};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// A running session runtime plus the channels to talk to it.
pub struct SessionHarness {
    pub tx: mpsc::Sender<SessionEvent>,
    pub ui_rx: mpsc::Receiver<UiUpdate>,
    pub runtime: JoinHandle<learnbench::errors::Result<()>>,
}

/// Spin up a session runtime over the given backend.
pub fn start_session<B>(backend: B, progress: Option<Box<dyn ProgressSink>>) -> SessionHarness
where
    B: ToolchainBackend + 'static,
{
    let (tx, rx) = mpsc::channel::<SessionEvent>(64);
    let (ui_tx, ui_rx) = mpsc::channel::<UiUpdate>(256);

    let runtime = SessionRuntime::new(SessionCore::new(), rx, backend, progress, ui_tx);
    let handle = tokio::spawn(runtime.run());

    SessionHarness {
        tx,
        ui_rx,
        runtime: handle,
    }
}

/// Poll until a job shows up in the recorded dispatch list.
pub async fn wait_for_dispatch(dispatched: &Arc<Mutex<Vec<JobSpec>>>) -> JobSpec {
    for _ in 0..100 {
        {
            let guard = dispatched.lock().unwrap();
            if let Some(job) = guard.last().cloned() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no job was dispatched");
}

/// Poll until `count` jobs have been dispatched.
pub async fn wait_for_dispatch_count(dispatched: &Arc<Mutex<Vec<JobSpec>>>, count: usize) {
    for _ in 0..100 {
        if dispatched.lock().unwrap().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} dispatched jobs");
}

/// Let the session loop settle, then drain whatever UI updates are queued.
pub async fn settle_updates(ui_rx: &mut mpsc::Receiver<UiUpdate>) -> Vec<UiUpdate> {
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut out = Vec::new();
    while let Ok(update) = ui_rx.try_recv() {
        out.push(update);
    }
    out
}

/// Appended line texts within an update batch.
pub fn appended_texts(updates: &[UiUpdate]) -> Vec<String> {
    updates
        .iter()
        .filter_map(|u| match u {
            UiUpdate::Append(line) => Some(line.text.clone()),
            _ => None,
        })
        .collect()
}
