// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The watch runtime hands [`ScheduledRun`]s to an `ExecutorBackend` instead
//! of spawning them itself, so tests can swap in a fake that records
//! dispatches and reports completions directly.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::warn;

use crate::engine::{run_task, RuntimeEvent, ScheduledRun, TaskContext, TaskOutcome};
use crate::errors::Result;

pub trait ExecutorBackend: Send {
    /// Start a run. Must not wait for it to finish; completion is reported
    /// as `RuntimeEvent::TaskCompleted`.
    fn dispatch(
        &mut self,
        run: ScheduledRun,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs tasks from the registry on the Tokio runtime.
pub struct RealExecutorBackend {
    ctx: TaskContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealExecutorBackend {
    pub fn new(ctx: TaskContext, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { ctx, runtime_tx }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn dispatch(
        &mut self,
        run: ScheduledRun,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let ctx = self.ctx.clone();
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = match run_task(ctx, run.task.clone()).await {
                    Ok(()) => TaskOutcome::Success,
                    Err(err) => TaskOutcome::Failed(err.to_string()),
                };
                let event = RuntimeEvent::TaskCompleted {
                    task: run.task,
                    run_id: run.run_id,
                    outcome,
                };
                if tx.send(event).await.is_err() {
                    warn!("runtime gone; dropping task completion");
                }
            });
            Ok(())
        })
    }
}
