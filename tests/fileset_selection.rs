// tests/fileset_selection.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::Path;

use assetflow::fs::mock::MockFileSystem;
use assetflow::pipeline::Selector;
use proptest::prelude::*;

type TestResult = Result<(), Box<dyn Error>>;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn fixture() -> MockFileSystem {
    let fs = MockFileSystem::new();
    for path in [
        "/proj/app/images/src/cat.png",
        "/proj/app/images/src/dog.jpg",
        "/proj/app/images/src/icon.svg",
        "/proj/app/images/src/nested/deep.png",
        "/proj/app/images/sprite.svg",
        "/proj/app/css/style.min.css",
        "/proj/app/index.html",
        "/proj/app/scss/main.scss",
        "/proj/app/scss/partials/_vars.scss",
    ] {
        fs.add_file(path, b"x".to_vec());
    }
    fs
}

#[test]
fn include_star_does_not_cross_directories() -> TestResult {
    init_tracing();

    let fs = fixture();
    let selector = Selector::new("/proj/app/images/src", &strings(&["*.*"]), &[])?;
    let set = selector.select(&fs)?;

    assert_eq!(
        set.relative_strings(),
        strings(&["cat.png", "dog.jpg", "icon.svg"])
    );
    Ok(())
}

#[test]
fn exclusions_apply_regardless_of_order() -> TestResult {
    init_tracing();

    let fs = fixture();
    let selector = Selector::new(
        "/proj/app/images/src",
        &strings(&["**/*.*"]),
        &strings(&["*.svg"]),
    )?;
    let set = selector.select(&fs)?;

    assert_eq!(
        set.relative_strings(),
        strings(&["cat.png", "dog.jpg", "nested/deep.png"])
    );
    Ok(())
}

#[test]
fn force_include_readmits_excluded_paths() -> TestResult {
    init_tracing();

    let fs = fixture();
    let selector = Selector::new(
        "/proj/app",
        &strings(&["**/*.*"]),
        &strings(&["images/**/*.svg", "images/src/*.*", "scss/**/*.*s"]),
    )?
    .with_force_include(&strings(&["images/sprite.svg"]))?;
    let set = selector.select(&fs)?;

    assert_eq!(
        set.relative_strings(),
        strings(&[
            "css/style.min.css",
            "images/sprite.svg",
            "images/src/nested/deep.png",
            "index.html",
        ])
    );
    Ok(())
}

#[test]
fn missing_base_selects_nothing() -> TestResult {
    init_tracing();

    let fs = fixture();
    let selector = Selector::new("/proj/app/fonts/src", &strings(&["*.*"]), &[])?;
    let set = selector.select(&fs)?;

    assert!(set.is_empty());
    assert_eq!(set.base(), Path::new("/proj/app/fonts/src"));
    Ok(())
}

#[test]
fn entries_join_base_and_relative_path() -> TestResult {
    init_tracing();

    let fs = fixture();
    let selector = Selector::new("/proj/app/scss", &strings(&["**/*.scss"]), &[])?;
    let set = selector.select(&fs)?;

    let entries: Vec<_> = set
        .entries()
        .map(|(rel, abs)| (rel.to_path_buf(), abs))
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, Path::new("main.scss"));
    assert_eq!(entries[0].1, Path::new("/proj/app/scss/main.scss"));
    assert_eq!(
        entries[1].1,
        Path::new("/proj/app/scss/partials/_vars.scss")
    );
    Ok(())
}

#[test]
fn wildcards_skip_dotfiles_and_dot_directories() -> TestResult {
    init_tracing();

    let fs = fixture();
    fs.add_file("/proj/app/.DS_Store", b"x".to_vec());
    fs.add_file("/proj/app/images/src/.gitkeep", b"x".to_vec());
    fs.add_file("/proj/app/.cache/build.json", b"x".to_vec());
    fs.add_file("/proj/app/.htaccess", b"x".to_vec());

    let wildcard = Selector::new("/proj/app", &strings(&["**/*.*", "**/*", "*"]), &[])?;
    let selected = wildcard.select(&fs)?.relative_strings();
    assert!(
        selected.iter().all(|p| !p.split('/').any(|seg| seg.starts_with('.'))),
        "hidden paths selected: {selected:?}"
    );
    assert!(selected.contains(&"index.html".to_string()));

    let explicit = Selector::new("/proj/app", &strings(&["**/*.*", ".htaccess"]), &[])?;
    let selected = explicit.select(&fs)?.relative_strings();
    assert!(selected.contains(&".htaccess".to_string()));
    assert!(!selected.contains(&".DS_Store".to_string()));

    let forced = Selector::new("/proj/app", &strings(&["**/*.*"]), &[])?
        .with_force_include(&strings(&[".cache/*.json"]))?;
    assert!(forced.matches(".cache/build.json"));
    assert!(!forced.matches("images/src/.gitkeep"));
    Ok(())
}

#[test]
fn invalid_glob_is_reported() {
    init_tracing();

    let result = Selector::new("/proj/app", &strings(&["[unterminated"]), &[]);
    assert!(result.is_err());
}

proptest! {
    /// Excluding a file's own name always removes it, and force-including it
    /// always brings it back.
    #[test]
    fn exclusion_and_force_include_are_consistent(
        stem in "[a-z]{1,8}",
        ext in prop::sample::select(vec!["png", "jpg", "svg", "css"]),
    ) {
        let name = format!("{stem}.{ext}");
        let include = strings(&["*.*"]);
        let exclude = vec![name.clone()];

        let plain = Selector::new("/base", &include, &[]).unwrap();
        prop_assert!(plain.matches(&name));

        let excluded = Selector::new("/base", &include, &exclude).unwrap();
        prop_assert!(!excluded.matches(&name));

        let forced = excluded.with_force_include(&exclude).unwrap();
        prop_assert!(forced.matches(&name));
    }
}
