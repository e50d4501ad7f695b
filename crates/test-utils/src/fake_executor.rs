use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use assetflow::engine::{RuntimeEvent, ScheduledRun, TaskOutcome};
use assetflow::exec::ExecutorBackend;
use assetflow::errors::Result;

/// A fake executor that:
/// - records which runs were dispatched
/// - immediately reports `TaskCompleted`, failing the tasks listed in
///   `failing`.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<ScheduledRun>>>,
    failing: HashSet<String>,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        executed: Arc<Mutex<Vec<ScheduledRun>>>,
    ) -> Self {
        Self {
            runtime_tx,
            executed,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, task: &str) -> Self {
        self.failing.insert(task.to_string());
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn dispatch(
        &mut self,
        run: ScheduledRun,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let outcome = if self.failing.contains(&run.task) {
            TaskOutcome::Failed(format!("{} failed", run.task))
        } else {
            TaskOutcome::Success
        };

        Box::pin(async move {
            executed.lock().unwrap().push(run.clone());

            tx.send(RuntimeEvent::TaskCompleted {
                task: run.task,
                run_id: run.run_id,
                outcome,
            })
            .await
            .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
