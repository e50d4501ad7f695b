// src/config/mod.rs

//! Configuration loading and validation for assetflow.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like value ranges and composite shapes
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_config};
pub use model::{
    BuildSection, CompositeTaskConfig, ConfigFile, FontsSection, ImagesSection,
    PagesSection, ProjectSection, RawConfigFile, ScriptsSection, ServerSection,
    SpriteSection, StylesSection, WatchBindingConfig,
};
