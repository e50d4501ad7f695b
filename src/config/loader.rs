// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AssetflowError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        AssetflowError::ConfigError(format!("cannot read config file {:?}: {e}", path))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks value ranges, watch binding shapes and composite task shapes.
///
/// Task references (composites, watch bindings) are resolved later, once the
/// task registry exists.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the config for a run.
///
/// - An explicit path must exist.
/// - Without one, `Assetflow.toml` is used when present; otherwise the
///   built-in defaults apply.
///
/// Returns the config together with the path it was (or would have been)
/// read from; the project root is that path's directory.
pub fn resolve_config(explicit: Option<&str>) -> Result<(PathBuf, ConfigFile)> {
    match explicit {
        Some(path) => {
            let path = PathBuf::from(path);
            let cfg = load_and_validate(&path)?;
            Ok((path, cfg))
        }
        None => {
            let path = default_config_path();
            if path.is_file() {
                let cfg = load_and_validate(&path)?;
                Ok((path, cfg))
            } else {
                debug!(?path, "no config file found; using built-in defaults");
                Ok((path, ConfigFile::default()))
            }
        }
    }
}

/// Default config file name, looked up in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Assetflow.toml")
}
