// src/lib.rs

pub mod cli;
pub mod config;
pub mod content;
pub mod errors;
pub mod exercise;
pub mod logging;
pub mod progress;
pub mod runner;
pub mod session;
pub mod toolchain;

use std::path::Path;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::ConfigFile;
use crate::content::{Curriculum, DirContentStore};
use crate::exercise::Exercise;
use crate::progress::{ProgressSink, ProgressStatus, ProgressStore};
use crate::runner::{CargoBackend, RunMode, RunnerEvent};
use crate::session::{
    OutputLine, RunStatus, SessionCore, SessionEvent, SessionNotice, SessionRuntime, StreamKind,
    UiUpdate,
};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::load_or_default(Path::new(&args.config))?;

    match args.command {
        Command::Doctor => doctor(),
        Command::Lessons => show_lessons(&cfg),
        Command::Progress => show_progress(&cfg),
        Command::Hint { id } => show_hint(&cfg, &id),
        Command::Reset { id } => reset_exercise(&cfg, &id),
        Command::Run { file, test } => {
            let mode = if test { RunMode::Test } else { RunMode::Run };
            let code = std::fs::read_to_string(&file)?;
            drive_session(&cfg, None, code, mode, None).await
        }
        Command::Exercise { id, run, pristine } => {
            let mode = if run { RunMode::Run } else { RunMode::Test };
            run_exercise(&cfg, &id, mode, pristine).await
        }
    }
}

/// Open an exercise, restore any saved draft and run it through the session.
async fn run_exercise(cfg: &ConfigFile, id: &str, mode: RunMode, pristine: bool) -> Result<()> {
    let store = DirContentStore::from_config(&cfg.content);
    let exercise = Exercise::load(&store, id)?;

    let progress = ProgressStore::open(&cfg.progress.database)?;
    let code = if pristine {
        exercise.original_code.clone()
    } else {
        match progress.exercise(id)?.and_then(|p| p.last_code) {
            Some(draft) => {
                debug!(exercise = id, "restoring saved draft");
                draft
            }
            None => exercise.original_code.clone(),
        }
    };

    drive_session(cfg, Some(exercise), code, mode, Some(Box::new(progress))).await
}

/// Wire up the session pipeline and drive one run to a terminal status.
///
/// This ties together:
/// - the session core + runtime
/// - the cargo backend and its event feedback loop
/// - Ctrl-C → cancel handling
/// - a console renderer for `UiUpdate`s
async fn drive_session(
    cfg: &ConfigFile,
    exercise: Option<Exercise>,
    code: String,
    mode: RunMode,
    progress: Option<Box<dyn ProgressSink>>,
) -> Result<()> {
    // Session event channel.
    let (session_tx, session_rx) = mpsc::channel::<SessionEvent>(64);
    let (runner_tx, mut runner_rx) = mpsc::channel::<RunnerEvent>(64);
    let (ui_tx, mut ui_rx) = mpsc::channel::<UiUpdate>(64);

    // Cargo toolchain backend (real implementation in production).
    let backend = CargoBackend::new(runner_tx, cfg.runner.limits());

    let runtime = SessionRuntime::new(SessionCore::new(), session_rx, backend, progress, ui_tx);
    let runtime_handle = tokio::spawn(runtime.run());

    // Backend events feed back into the session loop.
    {
        let tx = session_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = runner_rx.recv().await {
                if tx.send(SessionEvent::Runner(event)).await.is_err() {
                    break;
                }
            }
        });
    }

    // Ctrl-C → cancel the in-flight job.
    {
        let tx = session_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(SessionEvent::CancelRequested).await;
        });
    }

    if let Some(exercise) = exercise {
        info!(exercise = %exercise.id, "opening exercise");
        session_tx.send(SessionEvent::ExerciseOpened(exercise)).await?;
    }
    session_tx.send(SessionEvent::RunRequested { mode, code }).await?;

    // Render console updates until the run reaches a terminal status.
    while let Some(update) = ui_rx.recv().await {
        match update {
            UiUpdate::Append(line) => render_line(&line),
            UiUpdate::Clear => {}
            UiUpdate::Notice(SessionNotice::ExerciseCompleted { exercise_id }) => {
                println!("exercise '{exercise_id}' completed; progress saved");
            }
            UiUpdate::Status(status) => {
                println!("==> {}", status.text());
                if status.is_terminal() {
                    break;
                }
            }
        }
    }

    // Stop consuming updates before shutting down so a still-streaming job
    // can't block the runtime on a full UI channel.
    drop(ui_rx);
    let _ = session_tx.send(SessionEvent::ShutdownRequested).await;
    runtime_handle.await??;

    Ok(())
}

fn render_line(line: &OutputLine) {
    match line.kind {
        StreamKind::Stdout | StreamKind::Info | StreamKind::Success => println!("{}", line.text),
        StreamKind::Stderr | StreamKind::Error => eprintln!("{}", line.text),
    }
}

fn doctor() -> Result<()> {
    let status = toolchain::detect();

    if status.installed {
        println!("toolchain ready");
    } else {
        println!("toolchain not found; install Rust from https://rustup.rs");
    }
    println!(
        "  cargo:  {}",
        status.cargo_version.as_deref().unwrap_or("not found")
    );
    println!(
        "  rustc:  {}",
        status.rustc_version.as_deref().unwrap_or("not found")
    );
    println!(
        "  rustup: {}",
        status.rustup_version.as_deref().unwrap_or("not found")
    );

    Ok(())
}

fn show_lessons(cfg: &ConfigFile) -> Result<()> {
    let store = DirContentStore::from_config(&cfg.content);
    let curriculum = Curriculum::load(&store)?;
    let progress = ProgressStore::open(&cfg.progress.database)?;

    for module in &curriculum.modules {
        println!("{} ({})", module.title, module.id);
        for lesson in &module.lessons {
            let marker = match progress.lesson(&lesson.id)?.map(|p| p.status) {
                Some(ProgressStatus::Completed) => "x",
                Some(ProgressStatus::InProgress) => "~",
                _ => " ",
            };
            println!(
                "  [{marker}] {:<24} {} pages",
                lesson.id,
                lesson.micro_lessons.len()
            );
        }
    }

    Ok(())
}

fn show_progress(cfg: &ConfigFile) -> Result<()> {
    let store = ProgressStore::open(&cfg.progress.database)?;
    let summary = store.summary()?;

    println!(
        "completed: {} lessons, {} exercises",
        summary.lessons_completed, summary.exercises_completed
    );

    let exercises = store.exercises()?;
    if exercises.is_empty() {
        println!("no exercises attempted yet");
        return Ok(());
    }

    println!();
    for ex in exercises {
        println!(
            "  {:<24} {:<12} {} attempts",
            ex.exercise_id,
            ex.status.as_str(),
            ex.attempts
        );
    }

    Ok(())
}

fn show_hint(cfg: &ConfigFile, id: &str) -> Result<()> {
    let store = DirContentStore::from_config(&cfg.content);
    let exercise = Exercise::load(&store, id)?;

    match exercise.hint() {
        Some(hint) => println!("{hint}"),
        None => println!("no hint available for '{id}'"),
    }

    Ok(())
}

fn reset_exercise(cfg: &ConfigFile, id: &str) -> Result<()> {
    let store = ProgressStore::open(&cfg.progress.database)?;
    store.clear_draft(id)?;
    println!("draft for '{id}' discarded");
    Ok(())
}
