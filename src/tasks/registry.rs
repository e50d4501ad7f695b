// src/tasks/registry.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::{AssetflowError, Result};
use crate::tasks::node::TaskNode;
use crate::types::TaskName;

/// Name -> task mapping.
///
/// Registering a name twice replaces the earlier task.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskNode>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the replaced task, if any.
    pub fn register(&mut self, name: impl Into<TaskName>, task: TaskNode) -> Option<TaskNode> {
        let name = name.into();
        let previous = self.tasks.insert(name.clone(), task);
        if previous.is_some() {
            debug!(task = %name, "task re-registered; replacing previous definition");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Result<&TaskNode> {
        self.tasks
            .get(name)
            .ok_or_else(|| AssetflowError::TaskNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskNode)> {
        self.tasks.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
