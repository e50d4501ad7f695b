// src/pipeline/fileset.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::fs::FileSystem;

/// Source selection: a base directory plus include/exclude glob patterns.
///
/// Patterns are evaluated against paths relative to `base`, using `/` as the
/// separator. `*` does not cross directory boundaries; `**` does.
///
/// A path is selected when it matches any include pattern and no exclude
/// pattern. Exclusions are global: their position relative to includes does
/// not matter. `force_include` patterns re-admit paths an exclusion removed
/// (e.g. keep `images/sprite.svg` while dropping `images/**/*.svg`).
///
/// Wildcards never select dotfiles or files under dot-directories
/// (`.DS_Store`, `.cache/x`); only a pattern with a segment that itself
/// starts with `.` (`.htaccess`, `**/.well-known/*`) admits them.
#[derive(Clone)]
pub struct Selector {
    base: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    force_include: Vec<String>,
    include_set: Admission,
    exclude_set: Option<GlobSet>,
    force_set: Option<Admission>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("base", &self.base)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("force_include", &self.force_include)
            .finish()
    }
}

impl Selector {
    pub fn new(base: impl Into<PathBuf>, include: &[String], exclude: &[String]) -> Result<Self> {
        let base = base.into();
        let include_set = Admission::new(include)
            .with_context(|| format!("building include globset for {:?}", base))?;
        let exclude_set = optional_globset(exclude)
            .with_context(|| format!("building exclude globset for {:?}", base))?;

        Ok(Self {
            base,
            include: include.to_vec(),
            exclude: exclude.to_vec(),
            force_include: Vec::new(),
            include_set,
            exclude_set,
            force_set: None,
        })
    }

    /// Add patterns that win over exclusions.
    pub fn with_force_include(mut self, patterns: &[String]) -> Result<Self> {
        self.force_set = if patterns.is_empty() {
            None
        } else {
            Some(
                Admission::new(patterns)
                    .with_context(|| format!("building force_include globset for {:?}", self.base))?,
            )
        };
        self.force_include = patterns.to_vec();
        Ok(self)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether a path relative to `base` (forward slashes) is selected.
    pub fn matches(&self, rel_path: &str) -> bool {
        if let Some(force) = &self.force_set {
            if force.admits(rel_path) {
                return true;
            }
        }
        if !self.include_set.admits(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Walk `base` and collect every selected file.
    ///
    /// A missing base directory yields an empty set rather than an error.
    pub fn select(&self, fs: &dyn FileSystem) -> Result<FileSet> {
        if !fs.is_dir(&self.base) {
            debug!(base = ?self.base, "selector base does not exist; empty selection");
            return Ok(FileSet::empty(self.base.clone()));
        }

        let mut files = Vec::new();
        let mut stack = vec![self.base.clone()];

        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Ok(rel) = path.strip_prefix(&self.base) {
                        if self.matches(&rel_string(rel)) {
                            files.push(rel.to_path_buf());
                        }
                    }
                }
            }
        }

        files.sort();
        debug!(base = ?self.base, count = files.len(), "selection collected");
        Ok(FileSet {
            base: self.base.clone(),
            files,
        })
    }

    /// Human-readable summary used by `--dry-run`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self.include.clone();
        parts.extend(self.exclude.iter().map(|p| format!("!{p}")));
        parts.extend(self.force_include.iter().map(|p| format!("+{p}")));
        format!("{} [{}]", self.base.display(), parts.join(", "))
    }
}

/// Ordered collection of selected files, stored relative to their base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    base: PathBuf,
    files: Vec<PathBuf>,
}

impl FileSet {
    pub fn empty(base: PathBuf) -> Self {
        Self {
            base,
            files: Vec::new(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Relative paths, sorted.
    pub fn relative(&self) -> &[PathBuf] {
        &self.files
    }

    /// Relative paths rendered with forward slashes.
    pub fn relative_strings(&self) -> Vec<String> {
        self.files.iter().map(|p| rel_string(p)).collect()
    }

    /// `(relative, absolute)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, PathBuf)> {
        self.files
            .iter()
            .map(|rel| (rel.as_path(), self.base.join(rel)))
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Path, &Path) -> bool) {
        let base = self.base.clone();
        self.files.retain(|rel| keep(rel, &base.join(rel)));
    }
}

/// Include-side patterns, split so hidden paths need an explicit dot pattern.
#[derive(Clone)]
struct Admission {
    all: GlobSet,
    dotted: Option<GlobSet>,
}

impl Admission {
    fn new(patterns: &[String]) -> Result<Self> {
        let dotted: Vec<String> = patterns
            .iter()
            .filter(|p| is_hidden(p))
            .cloned()
            .collect();
        Ok(Self {
            all: build_globset(patterns)?,
            dotted: optional_globset(&dotted)?,
        })
    }

    fn admits(&self, rel_path: &str) -> bool {
        if is_hidden(rel_path) {
            self.dotted.as_ref().is_some_and(|set| set.is_match(rel_path))
        } else {
            self.all.is_match(rel_path)
        }
    }
}

/// Whether any segment of a relative path (or pattern) names a dotfile or
/// dot-directory.
fn is_hidden(rel_path: &str) -> bool {
    rel_path.split('/').any(|seg| seg.starts_with('.') && seg != "." && seg != "..")
}

/// Render a relative path with forward slashes for glob matching.
pub fn rel_string(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Build a GlobSet where `*` does not match `/`.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn optional_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        Ok(None)
    } else {
        build_globset(patterns).map(Some)
    }
}
