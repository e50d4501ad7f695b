// src/watch/session.rs

//! The `watching` task: dev server plus watch coordinator until Ctrl-C.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TaskContext};
use crate::exec::RealExecutorBackend;
use crate::server::DevServer;
use crate::tasks::{Job, JobFuture};
use crate::watch::patterns::WatchBinding;
use crate::watch::watcher::spawn_watcher;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct WatchSession {
    bindings: Vec<WatchBinding>,
    host: String,
    port: u16,
    /// Directory served over HTTP.
    served_dir: PathBuf,
    /// Directory watched for changes.
    watch_root: PathBuf,
}

impl WatchSession {
    pub fn new(
        bindings: Vec<WatchBinding>,
        host: impl Into<String>,
        port: u16,
        served_dir: impl Into<PathBuf>,
        watch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bindings,
            host: host.into(),
            port,
            served_dir: served_dir.into(),
            watch_root: watch_root.into(),
        }
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }
}

impl Job for WatchSession {
    fn describe(&self) -> String {
        format!(
            "serve {} on {}:{}, watch {} ({} bindings)",
            self.served_dir.display(),
            self.host,
            self.port,
            self.watch_root.display(),
            self.bindings.len()
        )
    }

    fn run<'a>(&'a self, ctx: &'a TaskContext) -> JobFuture<'a> {
        Box::pin(async move {
            let server = DevServer::start(&self.host, self.port, &self.served_dir, ctx.reload().clone())?;

            let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(EVENT_CHANNEL_CAPACITY);
            let _watcher = spawn_watcher(&self.watch_root, self.bindings.clone(), rt_tx.clone())?;

            // Ctrl-C -> graceful shutdown.
            {
                let tx = rt_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("failed to listen for Ctrl+C: {e}");
                        return;
                    }
                    let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
                });
            }

            let core = CoreRuntime::new(
                ctx.registry().names().map(str::to_string),
                RuntimeOptions::default(),
            );
            let executor = RealExecutorBackend::new(ctx.clone(), rt_tx);
            let result = Runtime::new(core, rt_rx, executor, ctx.reload().clone())
                .run()
                .await;

            info!("stopping dev server");
            server.shutdown();
            result
        })
    }
}
