// src/pipeline/mod.rs

//! Source selection -> ordered transforms -> destination.
//!
//! A [`Pipeline`] reads every selected file, threads the batch through its
//! transforms strictly in order and writes only the final batch. An empty
//! selection is a successful no-op.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::engine::TaskContext;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::server::Notification;
use crate::tasks::{Job, JobFuture};
use crate::transform::{Asset, Transform};
use crate::types::NotifyKind;

pub mod fileset;
pub mod newer;
pub mod output;

pub use fileset::{FileSet, Selector};
pub use newer::NewerOnly;
pub use output::{content_digest, write_if_changed, WriteOutcome};

/// What a single pipeline invocation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub selected: usize,
    /// Sources skipped by the newer-only policy.
    pub skipped: usize,
    /// Absolute paths of outputs whose bytes changed.
    pub written: Vec<PathBuf>,
    pub unchanged: usize,
}

#[derive(Clone)]
pub struct Pipeline {
    name: String,
    selector: Selector,
    transforms: Vec<Arc<dyn Transform>>,
    destination: PathBuf,
    newer: Option<NewerOnly>,
    notify: Option<NotifyKind>,
    /// Base for paths carried in notifications (the served tree).
    notify_root: PathBuf,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("selector", &self.selector)
            .field("transforms", &self.transform_names())
            .field("destination", &self.destination)
            .field("newer", &self.newer)
            .field("notify", &self.notify)
            .finish()
    }
}

impl Pipeline {
    pub fn new(name: impl Into<String>, selector: Selector, destination: impl Into<PathBuf>) -> Self {
        let destination = destination.into();
        Self {
            name: name.into(),
            selector,
            transforms: Vec::new(),
            notify_root: destination.clone(),
            destination,
            newer: None,
            notify: None,
        }
    }

    /// Append a transform stage.
    pub fn pipe(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn newer_only(mut self, policy: NewerOnly) -> Self {
        self.newer = Some(policy);
        self
    }

    /// Notify the dev server after writing; paths are reported relative to
    /// `served_root`.
    pub fn notify(mut self, kind: NotifyKind, served_root: impl Into<PathBuf>) -> Self {
        self.notify = Some(kind);
        self.notify_root = served_root.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    fn transform_names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Run once and push at most one notification.
    pub async fn execute(&self, ctx: &TaskContext) -> Result<PipelineReport> {
        let this = self.clone();
        let fs = Arc::clone(ctx.fs());
        let report = tokio::task::spawn_blocking(move || this.execute_blocking(fs.as_ref()))
            .await
            .map_err(|e| anyhow!("pipeline '{}' worker failed: {e}", self.name))??;

        if !report.written.is_empty() {
            if let Some(kind) = self.notify {
                ctx.reload().publish(self.notification(kind, &report));
            }
        }
        Ok(report)
    }

    fn execute_blocking(&self, fs: &dyn FileSystem) -> Result<PipelineReport> {
        let mut files = self.selector.select(fs)?;
        let mut report = PipelineReport {
            selected: files.len(),
            ..PipelineReport::default()
        };

        if let Some(policy) = &self.newer {
            files.retain(|rel, abs| !policy.is_up_to_date(fs, abs, &self.destination, rel));
            report.skipped = report.selected - files.len();
        }

        if files.is_empty() {
            debug!(
                pipeline = %self.name,
                selected = report.selected,
                skipped = report.skipped,
                "nothing to process"
            );
            return Ok(report);
        }

        let mut assets = Vec::with_capacity(files.len());
        for (rel, abs) in files.entries() {
            let contents = fs.read(&abs)?;
            assets.push(Asset::new(rel, contents, abs));
        }

        for transform in &self.transforms {
            let before = assets.len();
            assets = transform.apply(assets)?;
            debug!(
                pipeline = %self.name,
                transform = transform.name(),
                inputs = before,
                outputs = assets.len(),
                "transform applied"
            );
        }

        for asset in assets {
            let target = self.destination.join(&asset.path);
            match write_if_changed(fs, &target, &asset.contents)? {
                WriteOutcome::Written => report.written.push(target),
                WriteOutcome::Unchanged => report.unchanged += 1,
            }
        }

        debug!(
            pipeline = %self.name,
            selected = report.selected,
            skipped = report.skipped,
            written = report.written.len(),
            unchanged = report.unchanged,
            "pipeline finished"
        );
        Ok(report)
    }

    fn notification(&self, kind: NotifyKind, report: &PipelineReport) -> Notification {
        match kind {
            NotifyKind::InjectCss => Notification::Css {
                paths: report
                    .written
                    .iter()
                    .map(|p| {
                        let rel = p.strip_prefix(&self.notify_root).unwrap_or(p);
                        format!("/{}", fileset::rel_string(rel))
                    })
                    .collect(),
            },
            NotifyKind::Reload => Notification::reload(format!("{} updated", self.name)),
        }
    }
}

impl Job for Pipeline {
    fn describe(&self) -> String {
        let stages = self.transform_names().join(" | ");
        let mut desc = format!(
            "{} -> [{}] -> {}",
            self.selector.describe(),
            stages,
            self.destination.display()
        );
        if self.newer.is_some() {
            desc.push_str(" (newer only)");
        }
        desc
    }

    fn run<'a>(&'a self, ctx: &'a TaskContext) -> JobFuture<'a> {
        Box::pin(async move {
            let report = self.execute(ctx).await?;
            if report.written.is_empty() {
                debug!(pipeline = %self.name, "no outputs changed");
            } else {
                info!(
                    pipeline = %self.name,
                    files = report.written.len(),
                    "wrote outputs to {}",
                    self.destination.display()
                );
            }
            Ok(())
        })
    }
}
