// src/tasks/builtin.rs

//! The standard front-end task set.
//!
//! | task            | shape                                            |
//! |-----------------|--------------------------------------------------|
//! | styles          | scss -> concat -> sass -> prefix/minify -> css/  |
//! | scripts         | js/index.js -> concat -> minify -> js/           |
//! | images:*        | avif / webp / optimise, each from the sources    |
//! | images          | sequence of the three image stages               |
//! | toWebp          | sources -> webp -> images/dist                   |
//! | sprite          | svg sources -> stack sprite                      |
//! | fonts           | convert containers, then ttf -> woff2            |
//! | pages           | pages/*.html with includes -> root               |
//! | clean, building | wipe dist / copy artifacts                       |
//! | build           | sequence(clean, building)                        |
//! | watching        | dev server + watch bindings                      |
//! | default         | parallel(styles, scripts, pages, watching)       |
//!
//! `[task.<name>]` composites are registered afterwards and replace
//! built-ins of the same name.

use std::sync::Arc;

use crate::build::{CleanOutput, CopyArtifacts};
use crate::config::model::{CompositeTaskConfig, ConfigFile};
use crate::engine::ProjectLayout;
use crate::errors::{AssetflowError, Result};
use crate::fs::FileSystem;
use crate::pipeline::{NewerOnly, Pipeline, Selector};
use crate::tasks::graph::validate_registry;
use crate::tasks::node::TaskNode;
use crate::tasks::registry::TaskRegistry;
use crate::transform::{
    CompileStyles, Concat, ConvertAvif, ConvertFonts, ConvertWebp, IncludeHtml, MinifyScript,
    OptimizeImage, PrefixStyles, SvgSprite, Ttf2Woff2,
};
use crate::types::{NotifyKind, OutputStyle};
use crate::watch::{build_bindings, check_binding_tasks, WatchSession};

/// Build and validate the full registry for a config.
///
/// Fails on bad globs, unknown task references (composites and watch
/// bindings) and composition cycles.
pub fn build_registry(
    cfg: &ConfigFile,
    layout: &ProjectLayout,
    fs: Arc<dyn FileSystem>,
) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    register_builtin(&mut registry, cfg, layout, fs)?;

    for (name, composite) in cfg.tasks() {
        registry.register(name.clone(), composite_node(name, composite)?);
    }

    validate_registry(&registry)?;
    let bindings = build_bindings(&cfg.watch_bindings())?;
    check_binding_tasks(&bindings, &registry)?;
    Ok(registry)
}

fn composite_node(name: &str, cfg: &CompositeTaskConfig) -> Result<TaskNode> {
    match (&cfg.sequence, &cfg.parallel) {
        (Some(members), None) => Ok(TaskNode::Sequence(members.clone())),
        (None, Some(members)) => Ok(TaskNode::Parallel(members.clone())),
        _ => Err(AssetflowError::ConfigError(format!(
            "[task.{name}] must define exactly one of `sequence` or `parallel`"
        ))),
    }
}

fn register_builtin(
    registry: &mut TaskRegistry,
    cfg: &ConfigFile,
    layout: &ProjectLayout,
    fs: Arc<dyn FileSystem>,
) -> Result<()> {
    let served_root = layout.in_root(&cfg.server().base_dir);

    // styles
    let styles = cfg.styles();
    let styles_src = layout.in_root(&styles.source);
    let pipeline = Pipeline::new(
        "styles",
        Selector::new(&styles_src, &styles.include, &styles.exclude)?,
        layout.in_root(&styles.output),
    )
    .pipe(Concat::new(&styles.file_name))
    .pipe(CompileStyles::new(styles.output_style, vec![styles_src.clone()]))
    .pipe(PrefixStyles::new(
        &styles.browsers,
        styles.output_style == OutputStyle::Compressed,
    )?)
    .notify(NotifyKind::InjectCss, &served_root);
    registry.register("styles", TaskNode::leaf(pipeline));

    // scripts
    let scripts = cfg.scripts();
    let pipeline = Pipeline::new(
        "scripts",
        Selector::new(layout.in_root(&scripts.source), &scripts.include, &scripts.exclude)?,
        layout.in_root(&scripts.output),
    )
    .pipe(Concat::new(&scripts.file_name))
    .pipe(MinifyScript::new())
    .notify(NotifyKind::Reload, &served_root);
    registry.register("scripts", TaskNode::leaf(pipeline));

    // images: three independent passes over the same source selection
    let images = cfg.images();
    let image_selector = Selector::new(layout.in_root(&images.source), &images.include, &images.exclude)?;
    let image_out = layout.in_root(&images.output);
    registry.register(
        "images:avif",
        TaskNode::leaf(
            Pipeline::new("images:avif", image_selector.clone(), &image_out)
                .newer_only(NewerOnly::with_extension("avif"))
                .pipe(ConvertAvif::new(images.avif_quality, images.avif_speed)),
        ),
    );
    registry.register(
        "images:webp",
        TaskNode::leaf(
            Pipeline::new("images:webp", image_selector.clone(), &image_out)
                .newer_only(NewerOnly::with_extension("webp"))
                .pipe(ConvertWebp::new()),
        ),
    );
    registry.register(
        "images:optimize",
        TaskNode::leaf(
            Pipeline::new("images:optimize", image_selector.clone(), &image_out)
                .newer_only(NewerOnly::same_name())
                .pipe(OptimizeImage::new(images.jpeg_quality)),
        ),
    );
    registry.register(
        "images",
        TaskNode::sequence(["images:avif", "images:webp", "images:optimize"]),
    );
    registry.register(
        "toWebp",
        TaskNode::leaf(
            Pipeline::new("toWebp", image_selector, layout.in_root(&images.webp_output))
                .pipe(ConvertWebp::new()),
        ),
    );

    // sprite
    let sprite = cfg.sprite();
    registry.register(
        "sprite",
        TaskNode::leaf(
            Pipeline::new(
                "sprite",
                Selector::new(layout.in_root(&sprite.source), &sprite.include, &sprite.exclude)?,
                layout.in_root(&sprite.output),
            )
            .pipe(SvgSprite::new(&sprite.file_name, sprite.example)),
        ),
    );

    // fonts
    let fonts = cfg.fonts();
    let fonts_out = layout.in_root(&fonts.output);
    registry.register(
        "fonts:convert",
        TaskNode::leaf(
            Pipeline::new(
                "fonts:convert",
                Selector::new(layout.in_root(&fonts.source), &fonts.include, &fonts.exclude)?,
                &fonts_out,
            )
            .pipe(ConvertFonts::new(fonts.formats.clone())),
        ),
    );
    registry.register(
        "fonts:woff2",
        TaskNode::leaf(
            Pipeline::new(
                "fonts:woff2",
                Selector::new(&fonts_out, &["*.ttf".to_string()], &[])?,
                &fonts_out,
            )
            .pipe(Ttf2Woff2::new()),
        ),
    );
    registry.register("fonts", TaskNode::sequence(["fonts:convert", "fonts:woff2"]));

    // pages
    let pages = cfg.pages();
    let include_paths = pages.include_paths.iter().map(|p| layout.in_root(p)).collect();
    registry.register(
        "pages",
        TaskNode::leaf(
            Pipeline::new(
                "pages",
                Selector::new(layout.in_root(&pages.source), &pages.include, &pages.exclude)?,
                layout.in_root(&pages.output),
            )
            .pipe(IncludeHtml::new(Arc::clone(&fs), include_paths)?)
            .notify(NotifyKind::Reload, &served_root),
        ),
    );

    // build
    let build = cfg.build();
    let manifest = Selector::new(layout.root(), &build.include, &build.exclude)?
        .with_force_include(&build.force_include)?;
    registry.register("clean", TaskNode::leaf(CleanOutput::new(layout.dist())));
    registry.register("building", TaskNode::leaf(CopyArtifacts::new(manifest, layout.dist())));
    registry.register("build", TaskNode::sequence(["clean", "building"]));

    // watching
    let server = cfg.server();
    registry.register(
        "watching",
        TaskNode::leaf(WatchSession::new(
            build_bindings(&cfg.watch_bindings())?,
            &server.host,
            server.port,
            &served_root,
            layout.root(),
        )),
    );

    registry.register(
        "default",
        TaskNode::parallel(["styles", "scripts", "pages", "watching"]),
    );

    Ok(())
}
