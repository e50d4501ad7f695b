// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::{BTreeSet, HashMap};

use tracing::{info, warn};

use crate::engine::{RuntimeOptions, ScheduledRun, TaskName, TaskOutcome, TriggerReason};
use crate::server::Notification;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start this run on the executor.
    DispatchTask(ScheduledRun),
    /// Push a notification to connected browsers.
    Notify(Notification),
    /// Request that the session ends (used when idle with `exit_when_idle`).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a task trigger.
///
/// Triggers are never serialised or debounced: a task that already has runs
/// in flight gets another concurrent run, and the overlap is logged.
pub fn handle_task_trigger(
    known: &BTreeSet<TaskName>,
    in_flight: &mut HashMap<TaskName, usize>,
    next_run_id: &mut u64,
    task: TaskName,
    reason: TriggerReason,
) -> CoreStep {
    if !known.contains(&task) {
        warn!(task = %task, "trigger for unknown task ignored");
        return CoreStep::continue_with(Vec::new());
    }

    let running = in_flight.entry(task.clone()).or_insert(0);
    if *running > 0 {
        warn!(
            task = %task,
            in_flight = *running,
            "task triggered while already running; runs will overlap"
        );
    }
    *running += 1;

    let run_id = *next_run_id;
    *next_run_id += 1;

    CoreStep::continue_with(vec![CoreCommand::DispatchTask(ScheduledRun {
        task,
        reason,
        run_id,
    })])
}

/// Handle a reload-only binding match.
pub fn handle_reload_request(path: String) -> CoreStep {
    CoreStep::continue_with(vec![CoreCommand::Notify(Notification::reload(format!(
        "{path} changed"
    )))])
}

/// Handle a finished run.
///
/// Failures are reported and the session keeps going.
pub fn handle_task_completion(
    in_flight: &mut HashMap<TaskName, usize>,
    options: &RuntimeOptions,
    task: TaskName,
    run_id: u64,
    outcome: TaskOutcome,
) -> CoreStep {
    if let Some(running) = in_flight.get_mut(&task) {
        *running = running.saturating_sub(1);
        if *running == 0 {
            in_flight.remove(&task);
        }
    }

    match &outcome {
        TaskOutcome::Success => info!(task = %task, run_id, "watch run finished"),
        TaskOutcome::Failed(error) => {
            warn!(task = %task, run_id, %error, "watch run failed; still watching")
        }
    }

    if options.exit_when_idle && in_flight.is_empty() {
        return CoreStep {
            commands: vec![CoreCommand::RequestExit],
            keep_running: false,
        };
    }

    CoreStep::continue_with(Vec::new())
}
