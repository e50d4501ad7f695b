// src/transform/fonts/mod.rs

//! Font container conversion.
//!
//! Accepts `.ttf`/`.otf` (sfnt) and `.woff` sources. Outlines are never
//! touched: a CFF-flavoured `.otf` written out as `.ttf` keeps its CFF table
//! and `OTTO` signature, and a warning names the file.

use tracing::warn;

use crate::errors::{AssetflowError, Result};
use crate::transform::{Asset, Transform};
use crate::types::FontFormat;

pub mod sfnt;
pub mod woff;
pub mod woff2;

pub use sfnt::Sfnt;

fn load(transform: &'static str, asset: &Asset) -> Result<Sfnt> {
    let parsed = if woff::is_woff(&asset.contents) {
        woff::decode(&asset.contents)
    } else if woff2::is_woff2(&asset.contents) {
        Err(anyhow::anyhow!("woff2 sources are not supported"))
    } else {
        Sfnt::parse(&asset.contents)
    };
    parsed.map_err(|e| AssetflowError::transform(transform, &asset.source, format!("{e:#}")))
}

/// True when `format` promises TrueType outlines but `font` carries CFF
/// ones, which are written through unconverted.
pub fn keeps_cff_outlines(font: &Sfnt, format: FontFormat) -> bool {
    format == FontFormat::Ttf && font.flavor == sfnt::CFF_FLAVOR
}

fn encode(transform: &'static str, asset: &Asset, font: &Sfnt, format: FontFormat) -> Result<Asset> {
    if keeps_cff_outlines(font, format) {
        warn!(
            source = ?asset.source,
            "CFF outlines are not converted to glyf; the .ttf output is an OpenType/CFF font"
        );
    }
    let bytes = match format {
        FontFormat::Woff => woff::encode(font),
        FontFormat::Woff2 => woff2::encode(font),
        FontFormat::Ttf | FontFormat::Otf => Ok(font.to_bytes()),
    }
    .map_err(|e| AssetflowError::transform(transform, &asset.source, format!("{e:#}")))?;
    Ok(asset.derive(asset.path.with_extension(format.extension()), bytes))
}

/// Convert each source font into every configured container format.
#[derive(Debug, Clone)]
pub struct ConvertFonts {
    formats: Vec<FontFormat>,
}

impl ConvertFonts {
    pub fn new(mut formats: Vec<FontFormat>) -> Self {
        formats.sort();
        formats.dedup();
        Self { formats }
    }
}

impl Transform for ConvertFonts {
    fn name(&self) -> &'static str {
        "fonts"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let mut out = Vec::with_capacity(assets.len() * self.formats.len());
        for asset in assets {
            match asset.extension().as_deref() {
                Some("ttf" | "otf" | "woff") => {}
                _ => {
                    warn!(source = ?asset.source, "unsupported font file; skipping");
                    continue;
                }
            }
            let font = load(self.name(), &asset)?;
            for format in &self.formats {
                out.push(encode(self.name(), &asset, &font, *format)?);
            }
        }
        Ok(out)
    }
}

/// `.ttf` -> `.woff2`.
#[derive(Debug, Clone, Default)]
pub struct Ttf2Woff2;

impl Ttf2Woff2 {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for Ttf2Woff2 {
    fn name(&self) -> &'static str {
        "ttf2woff2"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        assets
            .iter()
            .map(|asset| {
                let font = load(self.name(), asset)?;
                encode(self.name(), asset, &font, FontFormat::Woff2)
            })
            .collect()
    }
}
