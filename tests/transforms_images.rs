// tests/transforms_images.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetflow::build_context;
use assetflow::engine::run_task;
use assetflow::errors::AssetflowError;
use assetflow::fs::mock::MockFileSystem;
use assetflow::fs::FileSystem;
use assetflow::transform::{Asset, ConvertAvif, ConvertWebp, OptimizeImage, Transform};
use image::{DynamicImage, ImageFormat, RgbaImage};

type TestResult = Result<(), Box<dyn Error>>;

fn encoded(format: ImageFormat, shade: u8) -> Vec<u8> {
    let img = RgbaImage::from_fn(16, 16, |x, y| {
        image::Rgba([x as u8 * 16, y as u8 * 16, shade, 255])
    });
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format).expect("encode fixture image");
    bytes.into_inner()
}

fn image_asset(rel: &str, bytes: Vec<u8>) -> Asset {
    Asset::new(rel, bytes, PathBuf::from("/app/images/src").join(rel))
}

#[test]
fn avif_and_webp_change_extension_and_format() -> TestResult {
    init_tracing();

    let png = image_asset("cat.png", encoded(ImageFormat::Png, 10));

    let avif = ConvertAvif::new(50, 10).apply(vec![png.clone()])?;
    assert_eq!(avif[0].path, PathBuf::from("cat.avif"));
    assert_eq!(&avif[0].contents[4..8], b"ftyp");

    let webp = ConvertWebp::new().apply(vec![png])?;
    assert_eq!(webp[0].path, PathBuf::from("cat.webp"));
    assert_eq!(image::guess_format(&webp[0].contents)?, ImageFormat::WebP);
    Ok(())
}

#[test]
fn optimize_never_grows_files_and_passes_others_through() -> TestResult {
    init_tracing();

    let jpeg = encoded(ImageFormat::Jpeg, 200);
    let readme = image_asset("notes.txt", b"plain text".to_vec());
    let out = OptimizeImage::new(80).apply(vec![image_asset("dog.jpg", jpeg.clone()), readme.clone()])?;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].path, PathBuf::from("dog.jpg"));
    assert!(out[0].contents.len() <= jpeg.len());
    assert_eq!(image::guess_format(&out[0].contents)?, ImageFormat::Jpeg);
    assert_eq!(out[1], readme);
    Ok(())
}

#[test]
fn converters_skip_non_raster_inputs() -> TestResult {
    init_tracing();

    let svg = image_asset("icon.svg", b"<svg/>".to_vec());
    assert!(ConvertWebp::new().apply(vec![svg.clone()])?.is_empty());
    assert!(ConvertAvif::new(50, 10).apply(vec![svg])?.is_empty());
    Ok(())
}

#[test]
fn truncated_png_is_a_transform_error() {
    init_tracing();

    let mut png = encoded(ImageFormat::Png, 1);
    png.truncate(40);
    let result = ConvertWebp::new().apply(vec![image_asset("bad.png", png)]);
    assert!(matches!(result, Err(AssetflowError::Transform { transform: "webp", .. })));
}

#[tokio::test]
async fn images_task_writes_all_three_variants_and_skips_svg() -> TestResult {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/proj/app/images/src/cat.png", encoded(ImageFormat::Png, 3));
    fs.add_file("/proj/app/images/src/icon.svg", b"<svg/>".to_vec());

    let cfg = ConfigFileBuilder::new().fast_avif().build();
    let ctx = build_context("/proj", cfg, fs.clone())?;

    // AVIF encoding is slow in unoptimised builds; no timeout around it.
    run_task(ctx.clone(), "images").await?;

    for out in ["cat.avif", "cat.webp", "cat.png"] {
        assert!(
            fs.is_file(&Path::new("/proj/app/images").join(out)),
            "missing images/{out}"
        );
    }
    assert!(!fs.is_file(Path::new("/proj/app/images/icon.svg")));

    // Everything is up to date now; a rerun leaves outputs untouched.
    let avif = Path::new("/proj/app/images/cat.avif");
    let stamp = fs.modified(avif)?;
    run_task(ctx.clone(), "images").await?;
    assert_eq!(fs.modified(avif)?, stamp);

    with_timeout(run_task(ctx, "toWebp")).await?;
    assert!(fs.is_file(Path::new("/proj/app/images/dist/cat.webp")));
    Ok(())
}
