// src/logging.rs

//! Logging setup for `assetflow` using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` on the command line
//! 2. `ASSETFLOW_LOG`, either a bare level or full `EnvFilter` directives
//!    such as `info,assetflow::server=debug`
//! 3. `info`
//!
//! The watcher, HTTP and websocket crates log every event and frame at
//! debug; they are held at `warn` unless a directive names them.
//!
//! Everything goes to STDERR so `--dry-run` output on stdout stays clean.

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "ASSETFLOW_LOG";

const NOISY_DEPENDENCIES: &[&str] = &["notify", "tiny_http", "tungstenite", "globset"];

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(cli_level, env.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter {directives:?} (from {LOG_ENV})"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("installing log subscriber: {err}"))?;

    Ok(())
}

/// Build the `EnvFilter` directive string for a CLI level and the raw
/// `ASSETFLOW_LOG` value.
pub fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    let base = match (cli_level, env.map(str::trim).filter(|s| !s.is_empty())) {
        (Some(level), _) => level_directive(level).to_string(),
        (None, Some(raw)) => match parse_level_str(raw) {
            Some(level) => level_directive(level).to_string(),
            None => raw.to_string(),
        },
        (None, None) => level_directive(LogLevel::Info).to_string(),
    };

    let mut directives = vec![base];
    for dep in NOISY_DEPENDENCIES {
        if !directives[0].split(',').any(|d| d.trim().starts_with(dep)) {
            directives.push(format!("{dep}=warn"));
        }
    }
    directives.join(",")
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn parse_level_str(s: &str) -> Option<LogLevel> {
    match s.to_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warn),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}
