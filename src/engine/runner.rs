// src/engine/runner.rs

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::engine::TaskContext;
use crate::errors::Result;
use crate::tasks::TaskNode;
use crate::types::TaskName;

pub type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Run a registered task to completion.
///
/// - Leaf: run its job.
/// - Sequence: run members in order; the first failure stops the sequence.
/// - Parallel: start every member at once. The first failure is returned
///   immediately; members still running are detached and finish on their own.
pub fn run_task(ctx: TaskContext, name: impl Into<TaskName>) -> TaskFuture {
    let name = name.into();
    Box::pin(async move {
        let node = ctx.registry().get(&name)?.clone();

        info!(task = %name, "Starting '{name}'");
        let started = Instant::now();

        let result = match &node {
            TaskNode::Leaf(job) => job.run(&ctx).await,
            TaskNode::Sequence(members) => run_sequence(&ctx, members).await,
            TaskNode::Parallel(members) => run_parallel(&ctx, members).await,
        };

        match &result {
            Ok(()) => info!(task = %name, "Finished '{name}' after {:?}", started.elapsed()),
            Err(err) => error!(task = %name, error = %err, "'{name}' errored after {:?}", started.elapsed()),
        }
        result
    })
}

async fn run_sequence(ctx: &TaskContext, members: &[TaskName]) -> Result<()> {
    for member in members {
        run_task(ctx.clone(), member.clone()).await?;
    }
    Ok(())
}

async fn run_parallel(ctx: &TaskContext, members: &[TaskName]) -> Result<()> {
    let mut set = JoinSet::new();
    for member in members {
        set.spawn(run_task(ctx.clone(), member.clone()));
    }

    while let Some(joined) = set.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => Err(anyhow!("parallel task aborted: {e}").into()),
        };
        if let Err(err) = outcome {
            set.detach_all();
            return Err(err);
        }
    }
    Ok(())
}
