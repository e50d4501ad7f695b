// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{FontFormat, OutputStyle, TaskName};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [project]
/// root = "app"
/// dist = "dist"
///
/// [styles]
/// output_style = "expanded"
///
/// [[watch]]
/// paths = ["scss/**/*.scss"]
/// task = "styles"
///
/// [task.release]
/// sequence = ["styles", "scripts", "build"]
/// ```
///
/// Every section is optional; the defaults describe the classic
/// `app/` + `dist/` front-end layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub styles: StylesSection,
    #[serde(default)]
    pub scripts: ScriptsSection,
    #[serde(default)]
    pub images: ImagesSection,
    #[serde(default)]
    pub sprite: SpriteSection,
    #[serde(default)]
    pub fonts: FontsSection,
    #[serde(default)]
    pub pages: PagesSection,
    #[serde(default)]
    pub build: BuildSection,

    /// `[[watch]]` bindings. When absent the default binding list is used.
    #[serde(default)]
    pub watch: Option<Vec<WatchBindingConfig>>,

    /// Custom composite tasks from `[task.<name>]`.
    #[serde(default)]
    pub task: BTreeMap<TaskName, CompositeTaskConfig>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (or `Default`, which
/// is valid by construction), so holders can rely on the checks in
/// `validate.rs` having passed.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    raw: RawConfigFile,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self { raw }
    }

    pub fn project(&self) -> &ProjectSection {
        &self.raw.project
    }

    pub fn server(&self) -> &ServerSection {
        &self.raw.server
    }

    pub fn styles(&self) -> &StylesSection {
        &self.raw.styles
    }

    pub fn scripts(&self) -> &ScriptsSection {
        &self.raw.scripts
    }

    pub fn images(&self) -> &ImagesSection {
        &self.raw.images
    }

    pub fn sprite(&self) -> &SpriteSection {
        &self.raw.sprite
    }

    pub fn fonts(&self) -> &FontsSection {
        &self.raw.fonts
    }

    pub fn pages(&self) -> &PagesSection {
        &self.raw.pages
    }

    pub fn build(&self) -> &BuildSection {
        &self.raw.build
    }

    /// Effective watch bindings: the configured list, or the defaults.
    pub fn watch_bindings(&self) -> Vec<WatchBindingConfig> {
        self.raw
            .watch
            .clone()
            .unwrap_or_else(WatchBindingConfig::defaults)
    }

    pub fn tasks(&self) -> &BTreeMap<TaskName, CompositeTaskConfig> {
        &self.raw.task
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSection {
    /// Working tree holding sources and compiled assets.
    pub root: String,
    /// Output directory of the `build` task.
    pub dist: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            root: "app".to_string(),
            dist: "dist".to_string(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Served directory, relative to `project.root`.
    pub base_dir: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            base_dir: String::new(),
        }
    }
}

/// `[styles]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesSection {
    pub source: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub output: String,
    pub file_name: String,
    pub output_style: OutputStyle,
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            source: "scss".to_string(),
            include: vec!["**/*.scss".to_string()],
            exclude: Vec::new(),
            output: "css".to_string(),
            file_name: "style.min.css".to_string(),
            output_style: OutputStyle::Compressed,
            browsers: vec!["last 10 versions".to_string()],
        }
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptsSection {
    pub source: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub output: String,
    pub file_name: String,
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            source: "js".to_string(),
            include: vec!["index.js".to_string()],
            exclude: Vec::new(),
            output: "js".to_string(),
            file_name: "index.min.js".to_string(),
        }
    }
}

/// `[images]` section (shared by `images` and `toWebp`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesSection {
    pub source: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub output: String,
    /// Destination of the standalone `toWebp` task.
    pub webp_output: String,
    pub avif_quality: u8,
    /// rav1e speed preset, 1 (slowest) ..= 10 (fastest).
    pub avif_speed: u8,
    pub jpeg_quality: u8,
}

impl Default for ImagesSection {
    fn default() -> Self {
        Self {
            source: "images/src".to_string(),
            include: vec!["*.*".to_string()],
            exclude: vec!["*.svg".to_string()],
            output: "images".to_string(),
            webp_output: "images/dist".to_string(),
            avif_quality: 50,
            avif_speed: 6,
            jpeg_quality: 80,
        }
    }
}

/// `[sprite]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteSection {
    pub source: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub output: String,
    pub file_name: String,
    /// Also emit an HTML preview page under `stack/`.
    pub example: bool,
}

impl Default for SpriteSection {
    fn default() -> Self {
        Self {
            source: "images/src".to_string(),
            include: vec!["*.svg".to_string()],
            exclude: Vec::new(),
            output: "images".to_string(),
            file_name: "sprite.svg".to_string(),
            example: true,
        }
    }
}

/// `[fonts]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsSection {
    pub source: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub output: String,
    /// Formats produced by the conversion stage. `ttf` outputs are then
    /// additionally converted to `woff2`.
    pub formats: Vec<FontFormat>,
}

impl Default for FontsSection {
    fn default() -> Self {
        Self {
            source: "fonts/src".to_string(),
            include: vec!["*.*".to_string()],
            exclude: Vec::new(),
            output: "fonts".to_string(),
            formats: vec![FontFormat::Woff, FontFormat::Ttf],
        }
    }
}

/// `[pages]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesSection {
    pub source: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Destination relative to `project.root`; empty means the root itself.
    pub output: String,
    /// Directories searched for `=include` targets.
    pub include_paths: Vec<String>,
}

impl Default for PagesSection {
    fn default() -> Self {
        Self {
            source: "pages".to_string(),
            include: vec!["*.html".to_string()],
            exclude: Vec::new(),
            output: String::new(),
            include_paths: vec!["components".to_string()],
        }
    }
}

/// `[build]` section: the BuildManifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Patterns re-admitted after exclusions (e.g. the packed sprite).
    pub force_include: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            include: vec!["**/*.*".to_string()],
            exclude: vec![
                "components/**/*.html".to_string(),
                "fonts/src/*.*".to_string(),
                "images/src/*.*".to_string(),
                "images/**/*.svg".to_string(),
                "js/index.js".to_string(),
                "scss/**/*.*s".to_string(),
            ],
            force_include: vec!["images/sprite.svg".to_string()],
        }
    }
}

/// One `[[watch]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchBindingConfig {
    /// Glob patterns relative to `project.root`.
    pub paths: Vec<String>,
    /// Task to run when a matching path changes.
    #[serde(default)]
    pub task: Option<TaskName>,
    /// Push a plain reload to connected browsers instead of running a task.
    #[serde(default)]
    pub reload: bool,
}

impl WatchBindingConfig {
    pub fn task<N: Into<TaskName>>(paths: &[&str], task: N) -> Self {
        Self {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            task: Some(task.into()),
            reload: false,
        }
    }

    pub fn reload(paths: &[&str]) -> Self {
        Self {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            task: None,
            reload: true,
        }
    }

    /// The binding list used when the config has no `[[watch]]` entries.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::task(&["scss/**/*.scss"], "styles"),
            Self::task(&["images/src", "images/src/**"], "images"),
            Self::task(&["js/index.js"], "scripts"),
            Self::task(&["components/*", "pages/*"], "pages"),
            Self::reload(&["*.html"]),
        ]
    }
}

/// `[task.<name>]` section: a composite of other tasks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositeTaskConfig {
    /// Run these tasks one after another.
    #[serde(default)]
    pub sequence: Option<Vec<TaskName>>,
    /// Start these tasks concurrently.
    #[serde(default)]
    pub parallel: Option<Vec<TaskName>>,
}
