//! Full-pipeline tests with a scripted backend: dispatch, streamed output,
//! completion reconciliation and progress writes.

mod common;

use crate::common::{appended_texts, init_tracing, start_session};

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use learnbench::runner::{RunMode, RunnerEvent};
use learnbench::session::{RunStatus, SessionEvent, SessionNotice, UiUpdate};
use learnbench_test_utils::builders::ExerciseBuilder;
use learnbench_test_utils::fake_toolchain::{ScriptedStep, ScriptedToolchain};
use learnbench_test_utils::memory_progress::MemoryProgress;

type TestResult = Result<(), Box<dyn Error>>;

struct ScriptedRun {
    updates: Vec<UiUpdate>,
    final_status: RunStatus,
    attempts: Arc<Mutex<Vec<(String, String)>>>,
    completions: Arc<Mutex<Vec<(String, String)>>>,
}

/// Run one scripted job to a terminal status and collect everything the UI
/// surface saw.
async fn run_scripted(
    script: Vec<ScriptedStep>,
    exercise: Option<learnbench::exercise::Exercise>,
    code: &str,
    mode: RunMode,
) -> Result<ScriptedRun, Box<dyn Error>> {
    let (runner_tx, mut runner_rx) = mpsc::channel::<RunnerEvent>(64);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let backend = ScriptedToolchain::new(runner_tx, script, Arc::clone(&dispatched));

    let attempts = Arc::new(Mutex::new(Vec::new()));
    let completions = Arc::new(Mutex::new(Vec::new()));
    let progress = MemoryProgress::new(Arc::clone(&attempts), Arc::clone(&completions));

    let mut h = start_session(backend, Some(Box::new(progress)));

    // Backend events feed back into the session loop, as in production.
    {
        let tx = h.tx.clone();
        tokio::spawn(async move {
            while let Some(event) = runner_rx.recv().await {
                if tx.send(SessionEvent::Runner(event)).await.is_err() {
                    break;
                }
            }
        });
    }

    if let Some(exercise) = exercise {
        h.tx.send(SessionEvent::ExerciseOpened(exercise)).await?;
    }
    h.tx.send(SessionEvent::RunRequested {
        mode,
        code: code.to_string(),
    })
    .await?;

    let mut updates = Vec::new();
    let final_status = loop {
        let update = timeout(Duration::from_secs(5), h.ui_rx.recv())
            .await?
            .expect("ui channel closed before a terminal status");
        let status = match &update {
            UiUpdate::Status(status) if status.is_terminal() => Some(*status),
            _ => None,
        };
        updates.push(update);
        if let Some(status) = status {
            break status;
        }
    };

    h.tx.send(SessionEvent::ShutdownRequested).await?;
    let _ = timeout(Duration::from_secs(1), h.runtime).await;

    Ok(ScriptedRun {
        updates,
        final_status,
        attempts,
        completions,
    })
}

#[tokio::test]
async fn successful_run_of_finished_exercise_records_completion() -> TestResult {
    init_tracing();

    let exercise = ExerciseBuilder::new("variables1").complete().build();
    let code = exercise.original_code.clone();

    let run = run_scripted(
        vec![
            ScriptedStep::Stdout("Compiling learner_code v0.1.0".to_string()),
            ScriptedStep::Stdout("hello".to_string()),
            ScriptedStep::Complete {
                exit_code: 0,
                duration_ms: 842,
            },
        ],
        Some(exercise),
        &code,
        RunMode::Run,
    )
    .await?;

    assert_eq!(run.final_status, RunStatus::Completed { duration_ms: 842 });

    let texts = appended_texts(&run.updates);
    assert!(texts.contains(&"$ cargo run".to_string()));
    assert!(texts.contains(&"hello".to_string()));
    assert!(texts.contains(&"✓ Process exited with code 0 (842ms)".to_string()));

    assert!(run.updates.iter().any(|u| matches!(
        u,
        UiUpdate::Notice(SessionNotice::ExerciseCompleted { exercise_id }) if exercise_id == "variables1"
    )));

    let attempts = run.attempts.lock().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].0, "variables1");

    let completions = run.completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0], ("variables1".to_string(), code));

    Ok(())
}

#[tokio::test]
async fn unfinished_buffer_is_not_marked_completed() -> TestResult {
    init_tracing();

    // Sentinel still present: a green run must not complete the exercise.
    let exercise = ExerciseBuilder::new("variables2").build();
    let code = exercise.original_code.clone();

    let run = run_scripted(
        vec![ScriptedStep::Complete {
            exit_code: 0,
            duration_ms: 10,
        }],
        Some(exercise),
        &code,
        RunMode::Test,
    )
    .await?;

    assert_eq!(run.final_status, RunStatus::Completed { duration_ms: 10 });
    assert!(
        !run.updates
            .iter()
            .any(|u| matches!(u, UiUpdate::Notice(_)))
    );
    assert_eq!(run.attempts.lock().unwrap().len(), 1);
    assert!(run.completions.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn failed_run_records_attempt_only() -> TestResult {
    init_tracing();

    let exercise = ExerciseBuilder::new("functions1").complete().build();
    let code = exercise.original_code.clone();

    let run = run_scripted(
        vec![
            ScriptedStep::Stderr("error[E0425]: cannot find value `x`".to_string()),
            ScriptedStep::Complete {
                exit_code: 101,
                duration_ms: 55,
            },
        ],
        Some(exercise),
        &code,
        RunMode::Test,
    )
    .await?;

    assert_eq!(run.final_status, RunStatus::Failed { exit_code: 101 });
    assert!(
        appended_texts(&run.updates)
            .iter()
            .any(|t| t.contains("E0425"))
    );
    assert_eq!(run.attempts.lock().unwrap().len(), 1);
    assert!(run.completions.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn run_without_exercise_touches_no_progress() -> TestResult {
    init_tracing();

    let run = run_scripted(
        vec![ScriptedStep::Complete {
            exit_code: 0,
            duration_ms: 7,
        }],
        None,
        "fn main() {}",
        RunMode::Run,
    )
    .await?;

    assert_eq!(run.final_status, RunStatus::Completed { duration_ms: 7 });
    assert!(run.attempts.lock().unwrap().is_empty());
    assert!(run.completions.lock().unwrap().is_empty());

    Ok(())
}
