// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in task graph: {0}")]
    TaskCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A transform rejected one of its input files (bad syntax, corrupt data).
    #[error("{transform} failed on {path:?}: {message}")]
    Transform {
        transform: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("dev server could not bind port {port}: {message}")]
    PortInUse { port: u16, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssetflowError {
    pub fn transform(
        transform: &'static str,
        path: impl Into<PathBuf>,
        message: impl std::fmt::Display,
    ) -> Self {
        AssetflowError::Transform {
            transform,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetflowError>;
