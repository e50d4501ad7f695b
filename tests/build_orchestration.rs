// tests/build_orchestration.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::{init_tracing, with_timeout, write_tree};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use assetflow::build::CopyArtifacts;
use assetflow::build_context;
use assetflow::engine::run_task;
use assetflow::fs::RealFileSystem;
use assetflow::pipeline::Selector;

type TestResult = Result<(), Box<dyn Error>>;

fn working_tree(project: &Path) {
    write_tree(
        project,
        &[
            ("app/index.html", "<html><body>home</body></html>"),
            ("app/css/style.min.css", "h1{color:red}"),
            ("app/js/index.js", "console.log('src');"),
            ("app/js/index.min.js", "console.log(1)"),
            ("app/scss/main.scss", "h1 { color: red; }"),
            ("app/images/src/cat.png", "raw source"),
            ("app/images/cat.webp", "webp"),
            ("app/images/icon.svg", "<svg/>"),
            ("app/images/sprite.svg", "<svg>sprite</svg>"),
            ("app/components/header.html", "<header/>"),
            ("app/fonts/src/Demo.ttf", "font source"),
            ("app/fonts/Demo.woff", "woff"),
            // Editor and OS litter never reaches dist.
            ("app/.DS_Store", "finder"),
            ("app/images/.gitkeep", ""),
            ("app/.vscode/settings.json", "{}"),
        ],
    );
}

fn listing(dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).expect("read dist") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(dir).expect("under dist");
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    out.sort();
    out
}

#[tokio::test]
async fn build_copies_only_final_artifacts() -> TestResult {
    init_tracing();

    let project = tempfile::tempdir()?;
    working_tree(project.path());
    let ctx = build_context(project.path(), ConfigFileBuilder::new().build(), Arc::new(RealFileSystem))?;

    with_timeout(run_task(ctx, "build")).await?;

    assert_eq!(
        listing(&project.path().join("dist")),
        vec![
            "css/style.min.css",
            "fonts/Demo.woff",
            "images/cat.webp",
            "images/sprite.svg",
            "index.html",
            "js/index.min.js",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn build_wipes_stale_output_first() -> TestResult {
    init_tracing();

    let project = tempfile::tempdir()?;
    working_tree(project.path());
    write_tree(project.path(), &[("dist/old/leftover.txt", "stale")]);
    let ctx = build_context(project.path(), ConfigFileBuilder::new().build(), Arc::new(RealFileSystem))?;

    with_timeout(run_task(ctx, "build")).await?;

    assert!(!project.path().join("dist/old").exists());
    assert!(project.path().join("dist/index.html").is_file());
    Ok(())
}

#[tokio::test]
async fn clean_tolerates_missing_output() -> TestResult {
    init_tracing();

    let project = tempfile::tempdir()?;
    let ctx = build_context(project.path(), ConfigFileBuilder::new().build(), Arc::new(RealFileSystem))?;

    with_timeout(run_task(ctx, "clean")).await?;
    assert!(!project.path().join("dist").exists());
    Ok(())
}

#[test]
fn repeated_copies_are_identical_and_only_changes_are_rewritten() -> TestResult {
    init_tracing();

    let project = tempfile::tempdir()?;
    working_tree(project.path());
    let root = project.path().join("app");
    let dist = project.path().join("dist");
    let cfg = ConfigFileBuilder::new().build();
    let manifest = Selector::new(&root, &cfg.build().include, &cfg.build().exclude)?
        .with_force_include(&cfg.build().force_include)?;
    let copy = CopyArtifacts::new(manifest, &dist);

    let first = copy.copy(&RealFileSystem)?;
    assert_eq!(first.written, first.files.len());

    let second = copy.copy(&RealFileSystem)?;
    assert_eq!(second.files, first.files, "same tree, same digests");
    assert_eq!(second.written, 0);

    std::fs::write(root.join("css/style.min.css"), "h1{color:blue}")?;
    let third = copy.copy(&RealFileSystem)?;
    assert_eq!(third.written, 1);
    assert_ne!(third.files["css/style.min.css"], first.files["css/style.min.css"]);
    assert_eq!(
        std::fs::read_to_string(dist.join("css/style.min.css"))?,
        "h1{color:blue}"
    );
    Ok(())
}

#[test]
fn output_inside_the_working_tree_is_not_copied_into_itself() -> TestResult {
    init_tracing();

    let project = tempfile::tempdir()?;
    write_tree(
        project.path(),
        &[("site/index.html", "home"), ("site/out/index.html", "old copy")],
    );
    let root = project.path().join("site");
    let selector = Selector::new(&root, &["**/*.*".to_string()], &[])?;
    let copy = CopyArtifacts::new(selector, root.join("out"));

    let report = copy.copy(&RealFileSystem)?;
    assert_eq!(report.files.keys().collect::<Vec<_>>(), vec!["index.html"]);
    assert!(!root.join("out/out").exists());
    Ok(())
}
