// src/transform/styles.rs

//! Sass compilation (`grass`) followed by vendor prefixing and minification
//! (`lightningcss`).

use std::path::PathBuf;

use anyhow::{anyhow, Result as AnyResult};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::errors::{AssetflowError, Result};
use crate::transform::{Asset, Transform};
use crate::types::OutputStyle;

/// Compile SCSS to CSS.
#[derive(Debug, Clone)]
pub struct CompileStyles {
    style: OutputStyle,
    load_paths: Vec<PathBuf>,
}

impl CompileStyles {
    pub fn new(style: OutputStyle, load_paths: Vec<PathBuf>) -> Self {
        Self { style, load_paths }
    }
}

impl Transform for CompileStyles {
    fn name(&self) -> &'static str {
        "compile-styles"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let grass_style = match self.style {
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
        };
        let options = self
            .load_paths
            .iter()
            .fold(grass::Options::default().style(grass_style), |opts, p| {
                opts.load_path(p)
            });

        assets
            .into_iter()
            .map(|asset| {
                let source = asset.text(self.name())?.to_string();
                let css = grass::from_string(source, &options)
                    .map_err(|e| AssetflowError::transform(self.name(), &asset.source, e))?;
                Ok(asset.derive(asset.path.with_extension("css"), css))
            })
            .collect()
    }
}

/// Add vendor prefixes for the configured browsers and optionally minify.
#[derive(Debug, Clone)]
pub struct PrefixStyles {
    browsers: Option<Browsers>,
    minify: bool,
}

impl PrefixStyles {
    /// `queries` are browserslist queries such as `"last 10 versions"`.
    pub fn new(queries: &[String], minify: bool) -> AnyResult<Self> {
        let browsers = if queries.is_empty() {
            None
        } else {
            Browsers::from_browserslist(queries.iter().map(String::as_str))
                .map_err(|e| anyhow!("invalid browserslist query {:?}: {e}", queries))?
        };
        Ok(Self { browsers, minify })
    }

    fn targets(&self) -> Targets {
        Targets {
            browsers: self.browsers,
            ..Targets::default()
        }
    }
}

impl Transform for PrefixStyles {
    fn name(&self) -> &'static str {
        "prefix-styles"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        assets
            .into_iter()
            .map(|asset| {
                let css = asset.text(self.name())?;
                let code = self
                    .process(css)
                    .map_err(|message| AssetflowError::transform(self.name(), &asset.source, message))?;
                Ok(asset.derive(asset.path.clone(), code))
            })
            .collect()
    }
}

impl PrefixStyles {
    fn process(&self, css: &str) -> std::result::Result<String, String> {
        let mut sheet = StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;
        sheet
            .minify(MinifyOptions {
                targets: self.targets(),
                ..MinifyOptions::default()
            })
            .map_err(|e| e.to_string())?;
        let out = sheet
            .to_css(PrinterOptions {
                minify: self.minify,
                targets: self.targets(),
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;
        Ok(out.code)
    }
}
