// src/engine/context.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::model::{ConfigFile, ProjectSection};
use crate::fs::FileSystem;
use crate::server::ReloadHub;
use crate::tasks::TaskRegistry;

/// Absolute locations derived from `[project]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    project_dir: PathBuf,
    root: PathBuf,
    dist: PathBuf,
}

impl ProjectLayout {
    /// `project_dir` is the directory holding the config file.
    pub fn new(project_dir: impl Into<PathBuf>, project: &ProjectSection) -> Self {
        let project_dir = project_dir.into();
        let root = join_rel(&project_dir, &project.root);
        let dist = join_rel(&project_dir, &project.dist);
        Self {
            project_dir,
            root,
            dist,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Working tree: sources and compiled assets.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dist(&self) -> &Path {
        &self.dist
    }

    /// A path relative to the working tree; `""` is the tree itself.
    pub fn in_root(&self, rel: &str) -> PathBuf {
        join_rel(&self.root, rel)
    }
}

fn join_rel(base: &Path, rel: &str) -> PathBuf {
    let rel = rel.trim_matches('/');
    if rel.is_empty() || rel == "." {
        base.to_path_buf()
    } else {
        base.join(rel)
    }
}

/// Everything a running task may need.
///
/// Cheap to clone: every field is shared. The registry is included so
/// composite tasks can resolve their members and the watch session can
/// dispatch bound tasks.
#[derive(Clone)]
pub struct TaskContext {
    layout: Arc<ProjectLayout>,
    config: Arc<ConfigFile>,
    registry: Arc<TaskRegistry>,
    fs: Arc<dyn FileSystem>,
    reload: ReloadHub,
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("layout", &self.layout)
            .field("tasks", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl TaskContext {
    pub fn new(
        layout: ProjectLayout,
        config: ConfigFile,
        registry: TaskRegistry,
        fs: Arc<dyn FileSystem>,
        reload: ReloadHub,
    ) -> Self {
        Self {
            layout: Arc::new(layout),
            config: Arc::new(config),
            registry: Arc::new(registry),
            fs,
            reload,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn reload(&self) -> &ReloadHub {
        &self.reload
    }
}
