// src/runner/backend.rs

//! Pluggable toolchain backend abstraction.
//!
//! The session talks to a `ToolchainBackend` instead of a raw mpsc sender.
//! This makes it easy to swap in a fake toolchain in tests while keeping the
//! production cargo implementation in [`dispatcher`] / [`cargo`].
//!
//! - `CargoBackend` is the default implementation used by `learnbench`. It
//!   wraps the dispatcher loop and just forwards jobs over an mpsc channel.
//! - Tests can provide their own `ToolchainBackend` that, for example,
//!   records which jobs were dispatched and directly emits `RunnerEvent`s.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::errors::{LearnbenchError, Result};

use super::dispatcher::{DispatcherMsg, spawn_dispatcher};
use super::{JobId, JobSpec, RunnerEvent, RunnerLimits};

/// Trait abstracting how jobs are executed.
///
/// Production code uses [`CargoBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ToolchainBackend: Send {
    /// Hand the job to the execution backend.
    ///
    /// The implementation is free to:
    /// - spawn an OS process (production)
    /// - simulate the event stream (tests)
    fn dispatch(&mut self, job: JobSpec) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Request that the given job's process be killed.
    ///
    /// Cancelling a job that is not live is a no-op.
    fn cancel(&mut self, job: JobId) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real toolchain backend used in production.
///
/// Internally, this just wraps the dispatcher loop in [`spawn_dispatcher`].
/// The session calls `dispatch`/`cancel`, which forward to the background
/// dispatcher via an mpsc channel.
pub struct CargoBackend {
    tx: mpsc::Sender<DispatcherMsg>,
}

impl CargoBackend {
    /// Create a new cargo backend, wiring it to the given runner event
    /// sender.
    ///
    /// This spawns the background dispatcher loop immediately.
    pub fn new(events_tx: mpsc::Sender<RunnerEvent>, limits: RunnerLimits) -> Self {
        let tx = spawn_dispatcher(events_tx, limits);
        Self { tx }
    }
}

impl ToolchainBackend for CargoBackend {
    fn dispatch(&mut self, job: JobSpec) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(DispatcherMsg::Dispatch(job))
                .await
                .map_err(|_| LearnbenchError::BackendUnavailable)?;
            Ok(())
        })
    }

    fn cancel(&mut self, job: JobId) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(DispatcherMsg::Cancel(job))
                .await
                .map_err(|_| LearnbenchError::BackendUnavailable)?;
            Ok(())
        })
    }
}
