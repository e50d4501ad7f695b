// src/tasks/mod.rs

//! Named, invocable units of work.
//!
//! - [`node`] defines the closed task shape: a leaf [`Job`], or a sequence /
//!   parallel group of other task names.
//! - [`registry`] maps names to nodes (last registration wins).
//! - [`graph`] validates references and rejects composition cycles.
//! - [`builtin`] registers the standard front-end tasks from a config.

pub mod builtin;
pub mod graph;
pub mod node;
pub mod registry;

pub use builtin::build_registry;
pub use node::{Job, JobFuture, TaskNode};
pub use registry::TaskRegistry;
