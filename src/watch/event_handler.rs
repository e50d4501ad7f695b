// src/watch/event_handler.rs

//! Turning file changes into runtime events.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{actions_for, WatchAction, WatchBinding};

/// Events for a change at `rel_path`: one per matching binding.
pub fn events_for_path(bindings: &[WatchBinding], rel_path: &str) -> Vec<RuntimeEvent> {
    actions_for(bindings, rel_path)
        .into_iter()
        .map(|action| match action {
            WatchAction::RunTask(task) => RuntimeEvent::TaskTriggered {
                task: task.clone(),
                reason: TriggerReason::FileWatch {
                    path: rel_path.to_string(),
                },
            },
            WatchAction::Reload => RuntimeEvent::ReloadRequested {
                path: rel_path.to_string(),
            },
        })
        .collect()
}

/// Forward the events for one changed path to the runtime.
///
/// Returns `false` once the runtime channel is closed.
pub async fn process_file_change(
    root: &Path,
    path: &Path,
    bindings: &[WatchBinding],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let Some(rel) = relative_str(root, path) else {
        warn!("could not relativize path {:?} against root {:?}", path, root);
        return true;
    };
    if rel.is_empty() {
        return true;
    }

    let events = events_for_path(bindings, &rel);
    if !events.is_empty() {
        debug!(path = %rel, count = events.len(), "watch match");
    }
    for event in events {
        if let Err(err) = runtime_tx.send(event).await {
            warn!("failed to forward watch event: {err}");
            return false;
        }
    }
    true
}
