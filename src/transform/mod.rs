// src/transform/mod.rs

//! File-content transforms.
//!
//! A [`Transform`] consumes the whole batch of assets produced by the
//! previous stage and returns the batch for the next one, so it can map
//! files one-to-one (minify, convert), fan out (one font -> several
//! containers) or fold (concat, sprite packing).
//!
//! Transforms are synchronous and CPU-bound; the pipeline runs them on the
//! blocking thread pool.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::{AssetflowError, Result};

pub mod concat;
pub mod fonts;
pub mod images;
pub mod include;
pub mod scripts;
pub mod sprite;
pub mod styles;

pub use concat::Concat;
pub use fonts::{ConvertFonts, Ttf2Woff2};
pub use images::{ConvertAvif, ConvertWebp, OptimizeImage};
pub use include::IncludeHtml;
pub use scripts::MinifyScript;
pub use sprite::SvgSprite;
pub use styles::{CompileStyles, PrefixStyles};

/// One file flowing through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Output path relative to the pipeline destination.
    pub path: PathBuf,
    pub contents: Vec<u8>,
    /// Absolute path of the file this asset was read from (or, for folded
    /// assets, the first contributing file). Used in error messages and for
    /// resolving relative includes.
    pub source: PathBuf,
}

impl Asset {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>, source: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            source: source.into(),
        }
    }

    /// Same source, new path and contents.
    pub fn derive(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self::new(path, contents, self.source.clone())
    }

    /// Contents as UTF-8, or a transform error naming the source file.
    pub fn text(&self, transform: &'static str) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .map_err(|e| AssetflowError::transform(transform, &self.source, e))
    }

    /// Lower-cased extension of the output path.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// A named step that rewrites a batch of assets.
pub trait Transform: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>>;
}
