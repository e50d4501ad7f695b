// src/transform/concat.rs

use std::path::PathBuf;

use crate::errors::Result;
use crate::transform::{Asset, Transform};

/// Join every asset into a single file, newline separated, in selection order.
#[derive(Debug, Clone)]
pub struct Concat {
    file_name: PathBuf,
}

impl Concat {
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Transform for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let Some(first) = assets.first() else {
            return Ok(Vec::new());
        };
        let source = first.source.clone();

        let mut joined = Vec::with_capacity(assets.iter().map(|a| a.contents.len() + 1).sum());
        for (idx, asset) in assets.iter().enumerate() {
            if idx > 0 {
                joined.push(b'\n');
            }
            joined.extend_from_slice(&asset.contents);
        }

        Ok(vec![Asset::new(self.file_name.clone(), joined, source)])
    }
}
