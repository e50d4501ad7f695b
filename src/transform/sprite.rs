// src/transform/sprite.rs

//! SVG "stack" sprite packing.
//!
//! Every source SVG becomes a nested `<svg id="<stem>">` inside one sprite
//! document. A `:target` rule shows only the referenced icon, so
//! `sprite.svg#icon` works in `<img src>` and CSS `url()`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result as AnyResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{AssetflowError, Result};
use crate::transform::{Asset, Transform};

const SPRITE_HEAD: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
    r#"<style>:root>svg{display:none}:root>svg:target{display:block}</style>"#,
);

/// Root attributes that must not be copied onto the nested icon. `xmlns` and
/// `xmlns:xlink` are declared once on the sprite root; any other prefix
/// declaration (`xmlns:inkscape`, `xmlns:serif`, ...) stays on the icon that
/// uses it.
const DROPPED_ATTRS: &[&str] = &["id", "version", "x", "y", "xmlns", "xmlns:xlink"];

#[derive(Debug, Clone)]
pub struct SvgSprite {
    file_name: PathBuf,
    example: bool,
}

impl SvgSprite {
    pub fn new(file_name: impl Into<PathBuf>, example: bool) -> Self {
        Self {
            file_name: file_name.into(),
            example,
        }
    }

    fn example_path(&self) -> PathBuf {
        let stem = self
            .file_name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sprite".to_string());
        Path::new("stack").join(format!("{stem}.stack.html"))
    }

    fn example_page(&self, ids: &[String]) -> String {
        let sprite = self.file_name.to_string_lossy();
        let items: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<li><img src="../{sprite}#{id}" width="48" height="48" alt="{id}"><code>{id}</code></li>"#
                )
            })
            .collect();
        format!(
            concat!(
                "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n",
                "<title>{sprite} preview</title>\n",
                "<style>ul{{list-style:none;display:flex;flex-wrap:wrap;gap:1rem}}",
                "li{{display:flex;flex-direction:column;align-items:center}}</style>\n",
                "</head>\n<body>\n<h1>{sprite}</h1>\n<ul>{items}</ul>\n</body>\n</html>\n"
            ),
            sprite = sprite,
            items = items
        )
    }
}

impl Transform for SvgSprite {
    fn name(&self) -> &'static str {
        "svg-sprite"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        let Some(first) = assets.first() else {
            return Ok(Vec::new());
        };
        let source = first.source.clone();

        let mut sprite = String::from(SPRITE_HEAD);
        let mut ids = Vec::with_capacity(assets.len());

        for asset in &assets {
            let id = symbol_id(&asset.path);
            let text = asset.text(self.name())?;
            let symbol = parse_symbol(text)
                .map_err(|e| AssetflowError::transform(self.name(), &asset.source, format!("{e:#}")))?;

            sprite.push_str(&format!("<svg id=\"{id}\""));
            for (key, value) in &symbol.attrs {
                sprite.push_str(&format!(" {key}=\"{value}\""));
            }
            sprite.push('>');
            sprite.push_str(symbol.inner.trim());
            sprite.push_str("</svg>");
            ids.push(id);
        }
        sprite.push_str("</svg>");

        let mut out = vec![Asset::new(self.file_name.clone(), sprite, source.clone())];
        if self.example {
            out.push(Asset::new(self.example_path(), self.example_page(&ids), source));
        }
        Ok(out)
    }
}

/// Root attributes and inner markup of one SVG file.
#[derive(Debug)]
struct Symbol {
    attrs: Vec<(String, String)>,
    inner: String,
}

fn symbol_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

fn parse_symbol(text: &str) -> AnyResult<Symbol> {
    let mut reader = Reader::from_str(text);

    let symbol = loop {
        match reader.read_event().context("parsing svg")? {
            Event::Start(e) if e.local_name().as_ref() == b"svg" => {
                let attrs = root_attrs(&e)?;
                let inner_start = reader.buffer_position() as usize;
                let inner_end = text
                    .rfind("</svg")
                    .filter(|&end| end >= inner_start)
                    .ok_or_else(|| anyhow!("missing closing </svg> tag"))?;
                break Symbol {
                    attrs,
                    inner: text[inner_start..inner_end].to_string(),
                };
            }
            Event::Empty(e) if e.local_name().as_ref() == b"svg" => {
                break Symbol {
                    attrs: root_attrs(&e)?,
                    inner: String::new(),
                };
            }
            Event::Start(e) | Event::Empty(e) => {
                bail!(
                    "root element is <{}>, expected <svg>",
                    String::from_utf8_lossy(e.name().as_ref())
                );
            }
            Event::Eof => bail!("no <svg> root element"),
            _ => {}
        }
    };

    // Drain the rest so malformed markup is reported instead of packed.
    loop {
        if let Event::Eof = reader.read_event().context("parsing svg")? {
            break;
        }
    }

    Ok(symbol)
}

fn root_attrs(start: &BytesStart<'_>) -> AnyResult<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    let mut has_view_box = false;
    let mut width = None;
    let mut height = None;

    for attr in start.attributes() {
        let attr = attr.context("reading svg attributes")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attr.value).into_owned();

        if DROPPED_ATTRS.contains(&key.as_str()) {
            continue;
        }
        match key.as_str() {
            "viewBox" => has_view_box = true,
            "width" => width = value.trim_end_matches("px").parse::<f64>().ok(),
            "height" => height = value.trim_end_matches("px").parse::<f64>().ok(),
            _ => {}
        }
        attrs.push((key, value));
    }

    if !has_view_box {
        if let (Some(w), Some(h)) = (width, height) {
            attrs.push(("viewBox".to_string(), format!("0 0 {w} {h}")));
        }
    }
    Ok(attrs)
}
