// tests/transforms_text.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use assetflow::errors::AssetflowError;
use assetflow::fs::mock::MockFileSystem;
use assetflow::transform::{
    Asset, CompileStyles, Concat, IncludeHtml, MinifyScript, PrefixStyles, SvgSprite, Transform,
};
use assetflow::types::OutputStyle;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

type TestResult = Result<(), Box<dyn Error>>;

fn asset(rel: &str, contents: &str) -> Asset {
    Asset::new(rel, contents, PathBuf::from("/src").join(rel))
}

fn text(asset: &Asset) -> &str {
    std::str::from_utf8(&asset.contents).expect("utf-8 output")
}

#[test]
fn concat_joins_in_selection_order() -> TestResult {
    init_tracing();

    let out = Concat::new("bundle.js").apply(vec![asset("b.js", "b();"), asset("a.js", "a();")])?;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].path, PathBuf::from("bundle.js"));
    assert_eq!(text(&out[0]), "b();\na();");
    assert!(Concat::new("x").apply(Vec::new())?.is_empty());
    Ok(())
}

#[test]
fn scss_compiles_to_compressed_css() -> TestResult {
    init_tracing();

    let source = "$accent: #ff0000;\n.button {\n  color: $accent;\n  .icon { width: 10px; }\n}\n";
    let out = CompileStyles::new(OutputStyle::Compressed, Vec::new())
        .apply(vec![asset("style.min.css", source)])?;

    let css = text(&out[0]);
    assert!(!css.contains('$'), "variables should be resolved: {css}");
    assert!(css.contains(".button .icon"), "nesting flattened: {css}");
    assert!(!css.trim_end().contains('\n'), "compressed: {css}");
    Ok(())
}

#[test]
fn expanded_style_keeps_line_breaks() -> TestResult {
    init_tracing();

    let out = CompileStyles::new(OutputStyle::Expanded, Vec::new())
        .apply(vec![asset("style.scss", ".a { color: red; }\n.b { color: blue; }\n")])?;

    assert_eq!(out[0].path, PathBuf::from("style.css"));
    assert!(text(&out[0]).lines().count() > 2);
    Ok(())
}

#[test]
fn scss_syntax_error_names_the_source() {
    init_tracing();

    let result = CompileStyles::new(OutputStyle::Compressed, Vec::new())
        .apply(vec![asset("broken.scss", ".a { color: $missing; }")]);

    match result {
        Err(AssetflowError::Transform { transform, path, .. }) => {
            assert_eq!(transform, "compile-styles");
            assert_eq!(path, PathBuf::from("/src/broken.scss"));
        }
        other => panic!("expected transform error, got {other:?}"),
    }
}

#[test]
fn prefixing_adds_vendor_prefixes_for_old_browsers() -> TestResult {
    init_tracing();

    let prefix = PrefixStyles::new(&["safari 8".to_string()], true)?;
    let out = prefix.apply(vec![asset("style.css", ".a { user-select: none; }")])?;

    let css = text(&out[0]);
    assert!(css.contains("-webkit-user-select:none"), "got {css}");
    assert!(!css.contains('\n'), "minified output: {css}");
    Ok(())
}

#[test]
fn invalid_browserslist_query_is_rejected() {
    init_tracing();

    assert!(PrefixStyles::new(&["definitely-not-a-browser 99".to_string()], true).is_err());
}

#[test]
fn scripts_are_minified() -> TestResult {
    init_tracing();

    let source = "function greet(personName) {\n  // say hello\n  console.log('hello ' + personName);\n}\ngreet(document.title);\n";
    let out = MinifyScript::new().apply(vec![asset("index.min.js", source)])?;

    let js = text(&out[0]);
    assert!(js.len() < source.len());
    assert!(!js.contains("say hello"), "comments stripped: {js}");
    assert!(!js.contains("personName"), "locals mangled: {js}");
    assert!(js.contains("console.log"));
    Ok(())
}

#[test]
fn script_globals_survive_minification() -> TestResult {
    init_tracing();

    let source = "function openMenu(menuElement) {\n  menuElement.classList.add('open');\n}\nvar siteName = 'zoo';\nlet visits = 0;\n";
    let out = MinifyScript::new().apply(vec![asset("index.min.js", source)])?;

    let js = text(&out[0]);
    assert!(js.contains("function openMenu("), "global function kept: {js}");
    assert!(js.contains("siteName"), "global var kept: {js}");
    assert!(js.contains("visits"), "top-level let kept: {js}");
    assert!(js.contains("'zoo'") || js.contains("\"zoo\""), "got {js}");
    assert!(!js.contains("menuElement"), "locals mangled: {js}");
    Ok(())
}

#[test]
fn script_syntax_error_fails() {
    init_tracing();

    let result = MinifyScript::new().apply(vec![asset("index.js", "function (")]);
    assert!(matches!(
        result,
        Err(AssetflowError::Transform { transform: "minify-script", .. })
    ));
}

fn include_fixture() -> Arc<MockFileSystem> {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/app/components/header.html", "<header>\n  <h1>Site</h1>\n</header>\n");
    fs.add_file("/app/components/footer.html", "<footer>bye</footer>\n");
    fs.add_file("/app/components/cards/one.html", "<div>1</div>\n");
    fs.add_file("/app/components/cards/two.html", "<div>2</div>\n");
    fs
}

fn include_html(fs: &Arc<MockFileSystem>) -> IncludeHtml {
    IncludeHtml::new(fs.clone(), vec![PathBuf::from("/app/components")])
        .expect("directive pattern compiles")
}

fn page(contents: &str) -> Asset {
    Asset::new("index.html", contents, "/app/pages/index.html")
}

#[test]
fn include_inlines_partials_with_indentation() -> TestResult {
    init_tracing();

    let fs = include_fixture();
    let html = "<body>\n  <!--=include header.html -->\n  <main></main>\n</body>\n";
    let out = include_html(&fs).apply(vec![page(html)])?;

    assert_eq!(
        text(&out[0]),
        "<body>\n  <header>\n    <h1>Site</h1>\n  </header>\n  <main></main>\n</body>\n"
    );
    assert_eq!(out[0].path, PathBuf::from("index.html"));
    Ok(())
}

#[test]
fn include_supports_globs_and_comment_styles() -> TestResult {
    init_tracing();

    let fs = include_fixture();
    let html = "//=include \"cards/*.html\"\n/*=include footer.html */\n";
    let out = include_html(&fs).apply(vec![page(html)])?;

    assert_eq!(text(&out[0]), "<div>1</div>\n<div>2</div>\n<footer>bye</footer>\n");
    Ok(())
}

#[test]
fn require_inlines_once_per_page() -> TestResult {
    init_tracing();

    let fs = include_fixture();
    let html = "<!--=require footer.html -->\n<!--=require footer.html -->\n<!--=include footer.html -->\n";
    let out = include_html(&fs).apply(vec![page(html)])?;

    assert_eq!(text(&out[0]).matches("<footer>").count(), 2);
    Ok(())
}

#[test]
fn missing_include_is_dropped() -> TestResult {
    init_tracing();

    let fs = include_fixture();
    let out = include_html(&fs).apply(vec![page("a\n<!--=include nope.html -->\nb\n")])?;

    assert_eq!(text(&out[0]), "a\nb\n");
    Ok(())
}

#[test]
fn include_cycle_fails() {
    init_tracing();

    let fs = include_fixture();
    fs.add_file("/app/components/a.html", "<!--=include b.html -->\n");
    fs.add_file("/app/components/b.html", "<!--=include a.html -->\n");

    let result = include_html(&fs).apply(vec![page("<!--=include a.html -->\n")]);
    match result {
        Err(AssetflowError::Transform { message, .. }) => {
            assert!(message.contains("include cycle"), "got {message}")
        }
        other => panic!("expected include cycle error, got {other:?}"),
    }
}

#[test]
fn sprite_nests_one_svg_per_source() -> TestResult {
    init_tracing();

    let icons = vec![
        asset(
            "arrow.svg",
            r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path d="M0 0L10 10"/></svg>"#,
        ),
        asset(
            "close icon.svg",
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" id="old"><circle r="4"/></svg>"#,
        ),
    ];
    let out = SvgSprite::new("sprite.svg", true).apply(icons)?;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].path, PathBuf::from("sprite.svg"));
    let sprite = text(&out[0]);
    assert_eq!(sprite.matches("<svg id=").count(), 2);
    assert!(sprite.contains(r#"<svg id="arrow" viewBox="0 0 10 10"><path d="M0 0L10 10"/></svg>"#));
    assert!(sprite.contains(r#"id="close-icon""#));
    assert!(sprite.contains(r#"viewBox="0 0 24 24""#));
    assert!(!sprite.contains(r#"id="old""#));
    assert!(sprite.contains(":target"));

    assert_eq!(out[1].path, PathBuf::from("stack/sprite.stack.html"));
    assert!(text(&out[1]).contains("../sprite.svg#arrow"));
    Ok(())
}

#[test]
fn sprite_keeps_editor_namespace_declarations() -> TestResult {
    init_tracing();

    let icon = asset(
        "icon.svg",
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" viewBox="0 0 4 4"><g inkscape:label="Layer 1"><path d="M0 0h4"/></g></svg>"#,
    );
    let out = SvgSprite::new("sprite.svg", false).apply(vec![icon])?;

    let sprite = text(&out[0]);
    assert!(
        sprite.contains(r#"<svg id="icon" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" viewBox="0 0 4 4">"#),
        "got {sprite}"
    );
    assert_eq!(sprite.matches("xmlns:xlink=").count(), 1);
    assert_eq!(sprite.matches("xmlns=").count(), 1);

    // The packed sprite must still be well-formed, namespaced XML.
    let mut reader = NsReader::from_str(sprite);
    loop {
        let (element_unknown, event) = {
            let (ns, event) = reader.read_resolved_event()?;
            (matches!(ns, ResolveResult::Unknown(_)), event)
        };
        assert!(!element_unknown, "undeclared element prefix in {sprite}");
        match event {
            Event::Start(e) | Event::Empty(e) => {
                for attr in e.attributes() {
                    let attr = attr?;
                    let (ns, _) = reader.resolve_attribute(attr.key);
                    assert!(
                        !matches!(ns, ResolveResult::Unknown(_)),
                        "undeclared attribute prefix in {sprite}"
                    );
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

#[test]
fn sprite_rejects_non_svg_input() {
    init_tracing();

    let result = SvgSprite::new("sprite.svg", false).apply(vec![asset("bad.svg", "<html></html>")]);
    assert!(matches!(result, Err(AssetflowError::Transform { .. })));
}
