// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::server::ReloadHub;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent, ScheduledRun};

/// Async IO shell around [`CoreRuntime`].
///
/// Reads events from the channel, feeds them to the core and executes the
/// returned commands: dispatching runs to the executor and publishing
/// notifications on the reload hub.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    reload: ReloadHub,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
        reload: ReloadHub,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
            reload,
        }
    }

    /// Main event loop. Returns when the core asks to stop or every sender
    /// is gone.
    pub async fn run(mut self) -> Result<()> {
        debug!("watch runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                debug!("core requested exit; stopping runtime");
                break;
            }
        }

        debug!("runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchTask(run) => self.dispatch(run).await?,
            CoreCommand::Notify(notification) => {
                self.reload.publish(notification);
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, run: ScheduledRun) -> Result<()> {
        debug!(task = %run.task, run_id = run.run_id, reason = ?run.reason, "dispatching run");
        self.executor.dispatch(run).await
    }
}
