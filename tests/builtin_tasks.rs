// tests/builtin_tasks.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::fixtures::sample_font;
use crate::common::{init_tracing, with_timeout, write_tree};

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use assetflow::build_context;
use assetflow::config::WatchBindingConfig;
use assetflow::engine::run_task;
use assetflow::errors::AssetflowError;
use assetflow::fs::mock::MockFileSystem;
use assetflow::fs::{FileSystem, RealFileSystem};
use assetflow::tasks::TaskNode;
use assetflow::transform::fonts::sfnt::CFF_FLAVOR;
use assetflow::types::OutputStyle;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn registry_contains_the_standard_task_set() -> TestResult {
    init_tracing();

    let ctx = build_context("/proj", ConfigFileBuilder::new().build(), Arc::new(MockFileSystem::new()))?;
    let registry = ctx.registry();

    for name in [
        "styles", "scripts", "images", "images:avif", "images:webp", "images:optimize", "toWebp",
        "sprite", "fonts", "fonts:convert", "fonts:woff2", "pages", "clean", "building", "build",
        "watching", "default",
    ] {
        assert!(registry.contains(name), "missing built-in task {name}");
    }

    assert!(matches!(registry.get("build")?, TaskNode::Sequence(m) if m == &["clean", "building"]));
    assert!(matches!(
        registry.get("default")?,
        TaskNode::Parallel(m) if m == &["styles", "scripts", "pages", "watching"]
    ));
    Ok(())
}

#[test]
fn composites_from_config_replace_builtins() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .sequence("default", &["styles", "build"])
        .parallel("assets", &["styles", "scripts", "pages"])
        .build();
    let ctx = build_context("/proj", cfg, Arc::new(MockFileSystem::new()))?;

    assert!(matches!(ctx.registry().get("default")?, TaskNode::Sequence(_)));
    assert_eq!(ctx.registry().get("assets")?.members().len(), 3);
    Ok(())
}

#[test]
fn composites_must_reference_known_tasks() {
    init_tracing();

    let cfg = ConfigFileBuilder::new().sequence("release", &["styles", "deploy"]).build();
    let result = build_context("/proj", cfg, Arc::new(MockFileSystem::new()));

    assert!(matches!(result, Err(AssetflowError::TaskNotFound(msg)) if msg.contains("deploy")));
}

#[test]
fn composite_cycles_are_rejected_at_startup() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .sequence("a", &["b"])
        .parallel("b", &["a"])
        .build();
    let result = build_context("/proj", cfg, Arc::new(MockFileSystem::new()));

    assert!(matches!(result, Err(AssetflowError::TaskCycle(_))));
}

#[test]
fn watch_bindings_must_name_registered_tasks() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .watch(WatchBindingConfig::task(&["*.md"], "docs"))
        .build();
    let result = build_context("/proj", cfg, Arc::new(MockFileSystem::new()));

    assert!(matches!(result, Err(AssetflowError::TaskNotFound(msg)) if msg.contains("docs")));
}

#[tokio::test]
async fn source_tasks_without_sources_succeed_quietly() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    let ctx = build_context("/proj", ConfigFileBuilder::new().build(), fs.clone())?;

    for task in ["styles", "scripts", "pages", "sprite", "fonts", "images"] {
        with_timeout(run_task(ctx.clone(), task)).await?;
    }
    assert!(fs.files().is_empty());
    Ok(())
}

#[tokio::test]
async fn release_flow_compiles_assets_then_builds() -> TestResult {
    init_tracing();

    let project = tempfile::tempdir()?;
    write_tree(
        project.path(),
        &[
            // Partials are concatenated ahead of the files that use them.
            ("app/scss/_vars.scss", "$accent: #336699;\n"),
            (
                "app/scss/main.scss",
                ".title { color: $accent; display: flex; }\n",
            ),
            (
                "app/js/index.js",
                "function shout(message) { return message.toUpperCase(); }\nfunction openMenu() { document.body.classList.add('open'); }\nconsole.log(shout('hi'));\n",
            ),
            ("app/components/header.html", "<header>Site</header>\n"),
            (
                "app/pages/index.html",
                "<html>\n<body>\n  <!--=include header.html -->\n</body>\n</html>\n",
            ),
            (
                "app/images/src/arrow.svg",
                "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 4 4\"><path d=\"M0 0h4\"/></svg>",
            ),
        ],
    );

    let cfg = ConfigFileBuilder::new()
        .output_style(OutputStyle::Compressed)
        .sequence("release", &["assets", "sprite", "build"])
        .parallel("assets", &["styles", "scripts", "pages"])
        .build();
    let ctx = build_context(project.path(), cfg, Arc::new(RealFileSystem))?;

    with_timeout(run_task(ctx, "release")).await?;

    let app = project.path().join("app");
    let css = std::fs::read_to_string(app.join("css/style.min.css"))?;
    assert!(css.contains(".title{"), "got {css}");
    assert!(css.contains("#369"), "variable resolved and minified: {css}");

    let js = std::fs::read_to_string(app.join("js/index.min.js"))?;
    assert!(!js.contains("message"), "got {js}");
    assert!(js.contains("function openMenu("), "page globals kept: {js}");

    let page = std::fs::read_to_string(app.join("index.html"))?;
    assert!(page.contains("  <header>Site</header>"), "got {page}");
    assert!(!page.contains("=include"));

    let sprite = std::fs::read_to_string(app.join("images/sprite.svg"))?;
    assert!(sprite.contains("<svg id=\"arrow\""));
    assert!(app.join("images/stack/sprite.stack.html").is_file());

    let dist = project.path().join("dist");
    for artifact in ["css/style.min.css", "js/index.min.js", "index.html", "images/sprite.svg"] {
        assert!(dist.join(artifact).is_file(), "dist is missing {artifact}");
    }
    assert!(!dist.join("scss").exists());
    Ok(())
}

#[tokio::test]
async fn watching_fails_fast_when_the_port_is_taken() -> TestResult {
    init_tracing();

    let project = tempfile::tempdir()?;
    write_tree(project.path(), &[("app/index.html", "<html></html>")]);
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();

    let cfg = ConfigFileBuilder::new().server("127.0.0.1", port).build();
    let ctx = build_context(project.path(), cfg, Arc::new(RealFileSystem))?;

    let result = with_timeout(run_task(ctx, "watching")).await;
    assert!(
        matches!(result, Err(AssetflowError::PortInUse { port: p, .. }) if p == port),
        "got {result:?}"
    );
    Ok(())
}

#[tokio::test]
async fn fonts_task_yields_woff_ttf_and_woff2() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/app/fonts/src/font.otf", sample_font(CFF_FLAVOR));
    let ctx = build_context("/proj", ConfigFileBuilder::new().build(), fs.clone())?;

    with_timeout(run_task(ctx, "fonts")).await?;

    let signatures: Vec<(PathBuf, Vec<u8>)> = ["font.woff", "font.ttf", "font.woff2"]
        .iter()
        .map(|name| {
            let path = PathBuf::from("/proj/app/fonts").join(name);
            let bytes = fs.read(&path).expect("font output written");
            (path, bytes[..4].to_vec())
        })
        .collect();
    assert_eq!(signatures[0].1, b"wOFF");
    assert_eq!(signatures[1].1, b"OTTO");
    assert_eq!(signatures[2].1, b"wOF2");
    Ok(())
}
