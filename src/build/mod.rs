// src/build/mod.rs

//! Build orchestration: wipe the output directory, then copy the final
//! artifacts of the working tree into it.
//!
//! Neither step runs asset pipelines; `build` assumes they already ran.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::engine::TaskContext;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::fileset::Selector;
use crate::pipeline::output::{content_digest, write_if_changed, WriteOutcome};
use crate::tasks::{Job, JobFuture};

/// Deletes the output directory tree. A missing directory is fine.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    dist: PathBuf,
}

impl CleanOutput {
    pub fn new(dist: impl Into<PathBuf>) -> Self {
        Self { dist: dist.into() }
    }
}

impl Job for CleanOutput {
    fn describe(&self) -> String {
        format!("delete {}", self.dist.display())
    }

    fn run<'a>(&'a self, ctx: &'a TaskContext) -> JobFuture<'a> {
        Box::pin(async move {
            let fs = Arc::clone(ctx.fs());
            let dist = self.dist.clone();
            let removed = tokio::task::spawn_blocking(move || fs.remove_dir_all(&dist))
                .await
                .map_err(|e| anyhow!("clean worker failed: {e}"))??;
            if removed {
                info!("removed {}", self.dist.display());
            } else {
                debug!(dist = ?self.dist, "output directory absent; nothing to clean");
            }
            Ok(())
        })
    }
}

/// Relative path -> blake3 digest of every copied artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub files: BTreeMap<String, String>,
    pub written: usize,
}

/// Copies the BuildManifest selection into the output directory,
/// preserving relative paths.
#[derive(Debug, Clone)]
pub struct CopyArtifacts {
    selector: Selector,
    dist: PathBuf,
}

impl CopyArtifacts {
    pub fn new(selector: Selector, dist: impl Into<PathBuf>) -> Self {
        Self {
            selector,
            dist: dist.into(),
        }
    }

    pub fn copy(&self, fs: &dyn FileSystem) -> Result<BuildReport> {
        let selection = self.selector.select(fs)?;
        let mut report = BuildReport::default();

        for (rel, abs) in selection.entries() {
            // The output directory may live inside the working tree.
            if abs.starts_with(&self.dist) {
                continue;
            }
            let contents = fs.read(&abs)?;
            let target = self.dist.join(rel);
            if write_if_changed(fs, &target, &contents)? == WriteOutcome::Written {
                report.written += 1;
            }
            report
                .files
                .insert(crate::pipeline::fileset::rel_string(rel), content_digest(&contents));
        }
        Ok(report)
    }
}

impl Job for CopyArtifacts {
    fn describe(&self) -> String {
        format!("copy {} -> {}", self.selector.describe(), self.dist.display())
    }

    fn run<'a>(&'a self, ctx: &'a TaskContext) -> JobFuture<'a> {
        Box::pin(async move {
            let this = self.clone();
            let fs = Arc::clone(ctx.fs());
            let report = tokio::task::spawn_blocking(move || this.copy(fs.as_ref()))
                .await
                .map_err(|e| anyhow!("copy worker failed: {e}"))??;
            info!(
                files = report.files.len(),
                written = report.written,
                "copied artifacts to {}",
                self.dist.display()
            );
            Ok(())
        })
    }
}
