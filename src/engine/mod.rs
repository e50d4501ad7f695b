// src/engine/mod.rs

//! Task execution engine.
//!
//! - [`runner`] runs a task by name, resolving sequence / parallel
//!   composition recursively.
//! - [`core`] is the pure state machine behind a watch session: it turns
//!   watch triggers and completions into commands.
//! - [`runtime`] is the async shell that feeds events into the core and
//!   executes its commands.
//! - [`context`] holds the shared state handed to every running task.

pub mod context;
pub mod core;
pub mod event_handlers;
pub mod runner;
pub mod runtime;

pub use crate::types::TaskName;
pub use context::{ProjectLayout, TaskContext};
pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runner::{run_task, TaskFuture};
pub use runtime::Runtime;

/// Outcome of one task run, as reported back to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(String),
}

/// Why a task was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerReason {
    /// Requested directly (CLI or test).
    Manual,
    /// A watched path changed.
    FileWatch { path: String },
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Stop once no runs are in flight (used by tests).
    pub exit_when_idle: bool,
}

/// A run the core wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRun {
    pub task: TaskName,
    pub reason: TriggerReason,
    pub run_id: u64,
}

/// Events flowing into the runtime from the watcher, executor and signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A bound task should run.
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    /// A reload-only binding matched.
    ReloadRequested { path: String },
    TaskCompleted {
        task: TaskName,
        run_id: u64,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}
