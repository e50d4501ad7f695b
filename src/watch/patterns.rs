// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::GlobSet;

use crate::config::model::WatchBindingConfig;
use crate::errors::AssetflowError;
use crate::pipeline::fileset::build_globset;
use crate::tasks::TaskRegistry;
use crate::types::TaskName;

/// What a matching change does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    RunTask(TaskName),
    /// Push a plain reload; no task runs.
    Reload,
}

/// Compiled `[[watch]]` entry.
///
/// Patterns are relative to the working tree and matched against
/// forward-slash relative paths; `*` does not cross `/`.
#[derive(Clone)]
pub struct WatchBinding {
    patterns: Vec<String>,
    set: GlobSet,
    action: WatchAction,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("patterns", &self.patterns)
            .field("action", &self.action)
            .finish()
    }
}

impl WatchBinding {
    pub fn compile(cfg: &WatchBindingConfig) -> Result<Self> {
        let action = match &cfg.task {
            Some(task) => WatchAction::RunTask(task.clone()),
            None => WatchAction::Reload,
        };
        let set = build_globset(&cfg.paths)
            .with_context(|| format!("building watch globset for {:?}", action))?;
        Ok(Self {
            patterns: cfg.paths.clone(),
            set,
            action,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn action(&self) -> &WatchAction {
        &self.action
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }

    pub fn describe(&self) -> String {
        let target = match &self.action {
            WatchAction::RunTask(task) => format!("run '{task}'"),
            WatchAction::Reload => "reload".to_string(),
        };
        format!("[{}] -> {target}", self.patterns.join(", "))
    }
}

pub fn build_bindings(configs: &[WatchBindingConfig]) -> Result<Vec<WatchBinding>> {
    configs.iter().map(WatchBinding::compile).collect()
}

/// Every bound task must exist in the registry.
pub fn check_binding_tasks(
    bindings: &[WatchBinding],
    registry: &TaskRegistry,
) -> std::result::Result<(), AssetflowError> {
    for binding in bindings {
        if let WatchAction::RunTask(task) = binding.action() {
            if !registry.contains(task) {
                return Err(AssetflowError::TaskNotFound(format!(
                    "{task} (referenced by watch binding {:?})",
                    binding.patterns()
                )));
            }
        }
    }
    Ok(())
}

/// Actions of every binding matching `rel_path`, in binding order.
pub fn actions_for<'a>(bindings: &'a [WatchBinding], rel_path: &str) -> Vec<&'a WatchAction> {
    bindings
        .iter()
        .filter(|b| b.matches(rel_path))
        .map(WatchBinding::action)
        .collect()
}
