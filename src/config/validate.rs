// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AssetflowError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AssetflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Run every structural check on a raw config.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_raw_config(cfg)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_project(cfg)?;
    validate_server(cfg)?;
    validate_assets(cfg)?;
    validate_watch_bindings(cfg)?;
    validate_composites(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> AssetflowError {
    AssetflowError::ConfigError(msg.into())
}

fn validate_project(cfg: &RawConfigFile) -> Result<()> {
    if cfg.project.dist.trim().is_empty() {
        return Err(config_error("[project].dist must not be empty"));
    }

    let dist = normalized_components(&cfg.project.dist);
    let root = normalized_components(&cfg.project.root);
    // `clean` removes dist recursively: it may not be the working tree, the
    // project directory or any directory containing them.
    let escapes_to_ancestor = dist.iter().all(|c| *c == "..");
    if escapes_to_ancestor || root.starts_with(&dist) {
        return Err(config_error(format!(
            "[project].dist ({:?}) must not be [project].root ({:?}) or a directory containing it (build deletes it)",
            cfg.project.dist, cfg.project.root
        )));
    }
    Ok(())
}

/// Lexical components of a project-relative path, as it is joined onto the
/// project directory: separators trimmed, `.` dropped, `..` folded.
fn normalized_components(rel: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for part in rel.split(['/', '\\']) {
        match part.trim() {
            "" | "." => {}
            ".." if out.last().is_some_and(|last| *last != "..") => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(config_error("[server].port must be >= 1 (got 0)"));
    }
    if cfg.server.host.trim().is_empty() {
        return Err(config_error("[server].host must not be empty"));
    }
    Ok(())
}

fn validate_assets(cfg: &RawConfigFile) -> Result<()> {
    ensure_file_name("styles", &cfg.styles.file_name)?;
    ensure_file_name("scripts", &cfg.scripts.file_name)?;
    ensure_file_name("sprite", &cfg.sprite.file_name)?;

    ensure_percent("images", "avif_quality", cfg.images.avif_quality)?;
    ensure_percent("images", "jpeg_quality", cfg.images.jpeg_quality)?;
    if !(1..=10).contains(&cfg.images.avif_speed) {
        return Err(config_error(format!(
            "[images].avif_speed must be within 1..=10 (got {})",
            cfg.images.avif_speed
        )));
    }

    if cfg.fonts.formats.is_empty() {
        return Err(config_error("[fonts].formats must list at least one format"));
    }

    Ok(())
}

fn ensure_file_name(section: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
        return Err(config_error(format!(
            "[{section}].file_name must be a plain file name (got {name:?})"
        )));
    }
    Ok(())
}

fn ensure_percent(section: &str, key: &str, value: u8) -> Result<()> {
    if !(1..=100).contains(&value) {
        return Err(config_error(format!(
            "[{section}].{key} must be within 1..=100 (got {value})"
        )));
    }
    Ok(())
}

fn validate_watch_bindings(cfg: &RawConfigFile) -> Result<()> {
    let Some(bindings) = cfg.watch.as_ref() else {
        return Ok(());
    };

    for (idx, binding) in bindings.iter().enumerate() {
        if binding.paths.is_empty() {
            return Err(config_error(format!(
                "[[watch]] entry #{} has no paths",
                idx + 1
            )));
        }
        match (&binding.task, binding.reload) {
            (Some(_), false) | (None, true) => {}
            (Some(task), true) => {
                return Err(config_error(format!(
                    "[[watch]] entry #{} sets both task '{}' and reload = true",
                    idx + 1,
                    task
                )));
            }
            (None, false) => {
                return Err(config_error(format!(
                    "[[watch]] entry #{} needs either `task` or `reload = true`",
                    idx + 1
                )));
            }
        }
    }
    Ok(())
}

fn validate_composites(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        let members = match (&task.sequence, &task.parallel) {
            (Some(members), None) | (None, Some(members)) => members,
            (Some(_), Some(_)) => {
                return Err(config_error(format!(
                    "task '{}' sets both `sequence` and `parallel`",
                    name
                )));
            }
            (None, None) => {
                return Err(config_error(format!(
                    "task '{}' needs either `sequence` or `parallel`",
                    name
                )));
            }
        };

        if members.is_empty() {
            return Err(config_error(format!("task '{}' has no members", name)));
        }
        if members.iter().any(|m| m == name) {
            return Err(config_error(format!(
                "task '{}' cannot contain itself",
                name
            )));
        }
    }
    Ok(())
}
