use std::str::FromStr;

use serde::Deserialize;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Output style of the compiled stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    Compressed,
    Expanded,
}

impl Default for OutputStyle {
    fn default() -> Self {
        OutputStyle::Compressed
    }
}

impl FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compressed" => Ok(OutputStyle::Compressed),
            "expanded" => Ok(OutputStyle::Expanded),
            other => Err(format!(
                "invalid output_style: {other} (expected \"compressed\" or \"expanded\")"
            )),
        }
    }
}

/// Font container formats the font transforms can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Woff,
    Woff2,
    Ttf,
    Otf,
}

impl FontFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
            FontFormat::Ttf => "ttf",
            FontFormat::Otf => "otf",
        }
    }
}

impl FromStr for FontFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "woff" => Ok(FontFormat::Woff),
            "woff2" => Ok(FontFormat::Woff2),
            "ttf" => Ok(FontFormat::Ttf),
            "otf" => Ok(FontFormat::Otf),
            other => Err(format!(
                "invalid font format: {other} (expected woff, woff2, ttf or otf)"
            )),
        }
    }
}

/// What a connected browser should do after an asset changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    /// Swap stylesheets in place.
    InjectCss,
    /// Full page reload.
    Reload,
}
