//! Leaf jobs that record when they start and finish.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use assetflow::config::model::ProjectSection;
use assetflow::engine::{ProjectLayout, TaskContext};
use assetflow::config::ConfigFile;
use assetflow::errors::AssetflowError;
use assetflow::fs::FileSystem;
use assetflow::fs::mock::MockFileSystem;
use assetflow::server::ReloadHub;
use assetflow::tasks::{Job, JobFuture, TaskRegistry};
use tokio::sync::Barrier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEventKind {
    Started,
    Finished,
}

#[derive(Debug, Clone)]
pub struct JobEvent {
    pub task: String,
    pub kind: JobEventKind,
    pub at: Instant,
}

/// Shared, ordered record of job events.
#[derive(Debug, Clone, Default)]
pub struct JobLog(Arc<Mutex<Vec<JobEvent>>>);

impl JobLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, task: &str, kind: JobEventKind) {
        self.0.lock().unwrap().push(JobEvent {
            task: task.to_string(),
            kind,
            at: Instant::now(),
        });
    }

    pub fn events(&self) -> Vec<JobEvent> {
        self.0.lock().unwrap().clone()
    }

    fn find(&self, task: &str, kind: JobEventKind) -> Option<Instant> {
        self.events()
            .into_iter()
            .find(|e| e.task == task && e.kind == kind)
            .map(|e| e.at)
    }

    pub fn started(&self, task: &str) -> Option<Instant> {
        self.find(task, JobEventKind::Started)
    }

    pub fn finished(&self, task: &str) -> Option<Instant> {
        self.find(task, JobEventKind::Finished)
    }

    /// Task names in the order they started.
    pub fn start_order(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == JobEventKind::Started)
            .map(|e| e.task)
            .collect()
    }
}

/// Sleeps for `delay`, optionally waiting on a barrier first, then succeeds
/// or fails.
#[derive(Debug, Clone)]
pub struct RecordingJob {
    name: String,
    delay: Duration,
    fail: bool,
    barrier: Option<Arc<Barrier>>,
    log: JobLog,
}

impl RecordingJob {
    pub fn new(name: &str, log: &JobLog) -> Self {
        Self {
            name: name.to_string(),
            delay: Duration::ZERO,
            fail: false,
            barrier: None,
            log: log.clone(),
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Wait on `barrier` after recording the start.
    pub fn barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }
}

impl Job for RecordingJob {
    fn describe(&self) -> String {
        format!("recording job {}", self.name)
    }

    fn run<'a>(&'a self, _ctx: &'a TaskContext) -> JobFuture<'a> {
        Box::pin(async move {
            self.log.push(&self.name, JobEventKind::Started);
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.log.push(&self.name, JobEventKind::Finished);
            if self.fail {
                return Err(AssetflowError::Other(anyhow::anyhow!("{} failed", self.name)));
            }
            Ok(())
        })
    }
}

/// A context over an in-memory filesystem rooted at `/proj`.
pub fn context_for(registry: TaskRegistry) -> TaskContext {
    context_with_fs(registry, Arc::new(MockFileSystem::new()))
}

/// A context over `fs` with the default layout under `/proj`.
pub fn context_with_fs(registry: TaskRegistry, fs: Arc<dyn FileSystem>) -> TaskContext {
    TaskContext::new(
        ProjectLayout::new("/proj", &ProjectSection::default()),
        ConfigFile::default(),
        registry,
        fs,
        ReloadHub::new(),
    )
}
