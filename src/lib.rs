// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod tasks;
pub mod transform;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::resolve_config;
use crate::config::model::ConfigFile;
use crate::engine::{run_task, ProjectLayout, TaskContext};
use crate::fs::{FileSystem, RealFileSystem};
use crate::server::ReloadHub;
use crate::tasks::{build_registry, TaskRegistry};

/// High-level entry point used by `main.rs`.
///
/// Loads the config, builds and validates the task registry, then runs the
/// requested task to completion.
pub async fn run(args: CliArgs) -> Result<()> {
    let (config_path, cfg) = resolve_config(args.config.as_deref())?;
    let project_dir = config_root_dir(&config_path);
    debug!(?config_path, ?project_dir, "configuration resolved");

    let ctx = build_context(project_dir, cfg, Arc::new(RealFileSystem))?;
    ctx.registry().get(&args.task)?;

    if args.dry_run {
        print_dry_run(&config_path, &ctx, &args.task);
        return Ok(());
    }

    info!(task = %args.task, root = ?ctx.layout().root(), "running");
    run_task(ctx, args.task).await?;
    Ok(())
}

/// Build the shared context (layout, validated registry, reload hub) for a
/// project directory.
pub fn build_context(
    project_dir: impl Into<PathBuf>,
    cfg: ConfigFile,
    fs: Arc<dyn FileSystem>,
) -> errors::Result<TaskContext> {
    let layout = ProjectLayout::new(project_dir, cfg.project());
    let registry = build_registry(&cfg, &layout, Arc::clone(&fs))?;
    Ok(TaskContext::new(layout, cfg, registry, fs, ReloadHub::new()))
}

/// Directory the config file lives in; the current directory for a bare
/// file name.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print the resolved task graph and watch bindings without running anything.
fn print_dry_run(config_path: &Path, ctx: &TaskContext, selected: &str) {
    let layout = ctx.layout();
    println!("assetflow dry-run");
    println!("  config = {}", config_path.display());
    println!("  root   = {}", layout.root().display());
    println!("  dist   = {}", layout.dist().display());
    println!();

    print_tasks(ctx.registry(), selected);

    let bindings = ctx.config().watch_bindings();
    println!();
    println!("watch ({}):", bindings.len());
    for binding in bindings {
        let target = match &binding.task {
            Some(task) => format!("run '{task}'"),
            None => "reload".to_string(),
        };
        println!("  - {:?} -> {target}", binding.paths);
    }

    debug!("dry-run complete (no execution)");
}

fn print_tasks(registry: &TaskRegistry, selected: &str) {
    println!("tasks ({}):", registry.len());
    for (name, node) in registry.iter() {
        let marker = if name == selected { "*" } else { "-" };
        println!("  {marker} {name}");
        println!("      {}", node.describe());
    }
}
