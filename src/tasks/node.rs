// src/tasks/node.rs

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::engine::TaskContext;
use crate::errors::Result;
use crate::types::TaskName;

pub type JobFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// The executable body of a leaf task.
///
/// Implemented by pipelines, the build steps and the watch session; tests
/// provide recording fakes.
pub trait Job: Send + Sync + fmt::Debug {
    /// One-line summary for `--dry-run`.
    fn describe(&self) -> String;

    fn run<'a>(&'a self, ctx: &'a TaskContext) -> JobFuture<'a>;
}

/// A registered task.
#[derive(Clone)]
pub enum TaskNode {
    Leaf(Arc<dyn Job>),
    /// Run members one after another; stop at the first failure.
    Sequence(Vec<TaskName>),
    /// Start all members at once.
    Parallel(Vec<TaskName>),
}

impl TaskNode {
    pub fn leaf(job: impl Job + 'static) -> Self {
        TaskNode::Leaf(Arc::new(job))
    }

    pub fn sequence<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        TaskNode::Sequence(members.into_iter().map(Into::into).collect())
    }

    pub fn parallel<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        TaskNode::Parallel(members.into_iter().map(Into::into).collect())
    }

    /// Names this node refers to (empty for leaves).
    pub fn members(&self) -> &[TaskName] {
        match self {
            TaskNode::Leaf(_) => &[],
            TaskNode::Sequence(members) | TaskNode::Parallel(members) => members,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TaskNode::Leaf(job) => job.describe(),
            TaskNode::Sequence(members) => format!("sequence({})", members.join(", ")),
            TaskNode::Parallel(members) => format!("parallel({})", members.join(", ")),
        }
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskNode::Leaf(job) => f.debug_tuple("Leaf").field(job).finish(),
            TaskNode::Sequence(m) => f.debug_tuple("Sequence").field(m).finish(),
            TaskNode::Parallel(m) => f.debug_tuple("Parallel").field(m).finish(),
        }
    }
}
