// src/exec/mod.rs

//! Execution layer for watch-triggered runs.
//!
//! [`backend`] provides the `ExecutorBackend` trait and the production
//! `RealExecutorBackend`, which runs registry tasks on Tokio and reports
//! completions back to the runtime.

pub mod backend;

pub use backend::{ExecutorBackend, RealExecutorBackend};
