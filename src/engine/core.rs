// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! Consumes [`RuntimeEvent`]s and produces commands for the IO shell
//! (`engine::runtime::Runtime`). No channels, no Tokio, no IO, so it can be
//! tested directly.

use std::collections::{BTreeSet, HashMap};

use crate::engine::event_handlers::{
    handle_reload_request, handle_task_completion, handle_task_trigger, CoreStep,
};
use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName};

#[derive(Debug)]
pub struct CoreRuntime {
    known: BTreeSet<TaskName>,
    /// Runs dispatched but not yet completed, per task.
    in_flight: HashMap<TaskName, usize>,
    next_run_id: u64,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new<I, S>(tasks: I, options: RuntimeOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        Self {
            known: tasks.into_iter().map(Into::into).collect(),
            in_flight: HashMap::new(),
            next_run_id: 1,
            options,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn in_flight(&self, task: &str) -> usize {
        self.in_flight.get(task).copied().unwrap_or(0)
    }

    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => handle_task_trigger(
                &self.known,
                &mut self.in_flight,
                &mut self.next_run_id,
                task,
                reason,
            ),
            RuntimeEvent::ReloadRequested { path } => handle_reload_request(path),
            RuntimeEvent::TaskCompleted {
                task,
                run_id,
                outcome,
            } => handle_task_completion(&mut self.in_flight, &self.options, task, run_id, outcome),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
