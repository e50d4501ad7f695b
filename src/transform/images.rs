// src/transform/images.rs

//! Raster image conversion: AVIF (ravif), lossless WEBP and re-encoding
//! optimisation (`image`).

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};
use ravif::{Encoder, Img, RGBA8};
use tracing::{debug, warn};

use crate::errors::{AssetflowError, Result};
use crate::transform::{Asset, Transform};

/// Formats we can decode. Anything else selected by the image glob is
/// passed over with a warning.
fn decodable(asset: &Asset) -> Option<ImageFormat> {
    match image::guess_format(&asset.contents) {
        Ok(fmt @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP)) => Some(fmt),
        _ => None,
    }
}

fn decode(transform: &'static str, asset: &Asset) -> Result<DynamicImage> {
    image::load_from_memory(&asset.contents)
        .map_err(|e| AssetflowError::transform(transform, &asset.source, e))
}

/// Encode each image as AVIF.
#[derive(Debug, Clone)]
pub struct ConvertAvif {
    quality: u8,
    speed: u8,
}

impl ConvertAvif {
    pub fn new(quality: u8, speed: u8) -> Self {
        Self { quality, speed }
    }
}

impl Transform for ConvertAvif {
    fn name(&self) -> &'static str {
        "avif"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let encoder = Encoder::new()
            .with_quality(f32::from(self.quality))
            .with_alpha_quality(f32::from(self.quality))
            .with_speed(self.speed);

        let mut out = Vec::with_capacity(assets.len());
        for asset in assets {
            if decodable(&asset).is_none() {
                warn!(source = ?asset.source, "not a decodable raster image; skipping avif");
                continue;
            }
            let rgba = decode(self.name(), &asset)?.to_rgba8();
            let (width, height) = rgba.dimensions();
            let pixels: Vec<RGBA8> = rgba
                .pixels()
                .map(|p| {
                    let [r, g, b, a] = p.0;
                    RGBA8::new(r, g, b, a)
                })
                .collect();

            let encoded = encoder
                .encode_rgba(Img::new(pixels.as_slice(), width as usize, height as usize))
                .map_err(|e| AssetflowError::transform(self.name(), &asset.source, e))?;

            debug!(source = ?asset.source, bytes = encoded.avif_file.len(), "encoded avif");
            out.push(asset.derive(asset.path.with_extension("avif"), encoded.avif_file));
        }
        Ok(out)
    }
}

/// Encode each image as lossless WEBP.
#[derive(Debug, Clone, Default)]
pub struct ConvertWebp;

impl ConvertWebp {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for ConvertWebp {
    fn name(&self) -> &'static str {
        "webp"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let mut out = Vec::with_capacity(assets.len());
        for asset in assets {
            if decodable(&asset).is_none() {
                warn!(source = ?asset.source, "not a decodable raster image; skipping webp");
                continue;
            }
            let img = DynamicImage::ImageRgba8(decode(self.name(), &asset)?.to_rgba8());

            let mut bytes = Vec::new();
            img.write_with_encoder(WebPEncoder::new_lossless(&mut bytes))
                .map_err(|e| AssetflowError::transform(self.name(), &asset.source, e))?;

            out.push(asset.derive(asset.path.with_extension("webp"), bytes));
        }
        Ok(out)
    }
}

/// Re-encode PNG/JPEG with tighter settings, keeping whichever of the
/// original and re-encoded bytes is smaller. Other files pass through.
#[derive(Debug, Clone)]
pub struct OptimizeImage {
    jpeg_quality: u8,
}

impl OptimizeImage {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    fn reencode(&self, format: ImageFormat, img: &DynamicImage) -> image::ImageResult<Option<Vec<u8>>> {
        let mut bytes = Vec::new();
        match format {
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut bytes,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                img.write_with_encoder(encoder)?;
            }
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality);
                DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
            }
            _ => return Ok(None),
        }
        Ok(Some(bytes))
    }
}

impl Transform for OptimizeImage {
    fn name(&self) -> &'static str {
        "optimize-image"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let mut out = Vec::with_capacity(assets.len());
        for asset in assets {
            let Some(format) = decodable(&asset) else {
                out.push(asset);
                continue;
            };
            let img = decode(self.name(), &asset)?;
            let reencoded = self
                .reencode(format, &img)
                .map_err(|e| AssetflowError::transform(self.name(), &asset.source, e))?;

            match reencoded {
                Some(bytes) if bytes.len() < asset.contents.len() => {
                    debug!(
                        source = ?asset.source,
                        before = asset.contents.len(),
                        after = bytes.len(),
                        "optimized image"
                    );
                    out.push(asset.derive(asset.path.clone(), bytes));
                }
                _ => out.push(asset),
            }
        }
        Ok(out)
    }
}
