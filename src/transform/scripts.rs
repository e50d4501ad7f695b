// src/transform/scripts.rs

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::errors::{AssetflowError, Result};
use crate::transform::{Asset, Transform};

/// Compress + mangle JavaScript with oxc.
///
/// Sources are classic scripts loaded with `<script src>`: top-level
/// declarations are page globals and keep their names.
#[derive(Debug, Clone, Default)]
pub struct MinifyScript;

impl MinifyScript {
    pub fn new() -> Self {
        Self
    }

    fn minify(source: &str) -> std::result::Result<String, String> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::script()).parse();
        if let Some(err) = ret.errors.first() {
            return Err(err.to_string());
        }
        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions {
                top_level: Some(false),
                ..MangleOptions::default()
            }),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Ok(code)
    }
}

impl Transform for MinifyScript {
    fn name(&self) -> &'static str {
        "minify-script"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        assets
            .into_iter()
            .map(|asset| {
                let code = Self::minify(asset.text(self.name())?)
                    .map_err(|e| AssetflowError::transform(self.name(), &asset.source, e))?;
                Ok(asset.derive(asset.path.clone(), code))
            })
            .collect()
    }
}
