// src/transform/include.rs

//! HTML partial inlining.
//!
//! Recognised directives, each alone on its line:
//!
//! ```text
//! <!--=include components/header.html -->
//! //=include "partials/*.html"
//! /*=require footer.html */
//! #=include nav.html
//! ```
//!
//! `require` inlines a file at most once per page; `include` always inlines.
//! Paths resolve against the including file's directory first, then each
//! configured include path. Inlined content gets the directive's indentation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result as AnyResult};
use regex::Regex;
use tracing::{debug, warn};

use crate::errors::{AssetflowError, Result};
use crate::fs::FileSystem;
use crate::pipeline::fileset::Selector;
use crate::transform::{Asset, Transform};

const DIRECTIVE_PATTERN: &str = r"^([ \t]*)(?:<!--|//|/\*|#)[ \t]*=[ \t]*(include|require)[ \t]+(.+?)[ \t]*(?:-->|\*/)?[ \t]*$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectiveKind {
    Include,
    Require,
}

#[derive(Debug)]
struct Directive<'a> {
    indent: &'a str,
    kind: DirectiveKind,
    target: &'a str,
}

/// Per-page expansion state.
#[derive(Debug, Default)]
struct PageState {
    /// Files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
    /// Every file inlined so far on this page.
    seen: HashSet<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct IncludeHtml {
    fs: Arc<dyn FileSystem>,
    include_paths: Vec<PathBuf>,
    directive: Regex,
}

impl IncludeHtml {
    /// `include_paths` should be absolute (or relative to the process cwd).
    pub fn new(fs: Arc<dyn FileSystem>, include_paths: Vec<PathBuf>) -> AnyResult<Self> {
        let directive = Regex::new(DIRECTIVE_PATTERN).context("compiling include directive pattern")?;
        Ok(Self {
            fs,
            include_paths,
            directive,
        })
    }

    fn parse_directive<'a>(&self, line: &'a str) -> Option<Directive<'a>> {
        let caps = self.directive.captures(line)?;
        let kind = match caps.get(2)?.as_str() {
            "require" => DirectiveKind::Require,
            _ => DirectiveKind::Include,
        };
        Some(Directive {
            indent: caps.get(1)?.as_str(),
            kind,
            target: unquote(caps.get(3)?.as_str()),
        })
    }

    fn expand(&self, text: &str, dir: &Path, state: &mut PageState) -> AnyResult<String> {
        let mut out = String::with_capacity(text.len());

        for raw_line in text.split_inclusive('\n') {
            let (line, ending) = split_ending(raw_line);
            let Some(directive) = self.parse_directive(line) else {
                out.push_str(raw_line);
                continue;
            };

            let files = self.resolve(directive.target, dir)?;
            if files.is_empty() {
                warn!(
                    include = directive.target,
                    from = ?state.stack.last(),
                    "include target not found; dropping directive"
                );
                continue;
            }

            for file in files {
                if state.stack.contains(&file) {
                    let chain: Vec<String> = state
                        .stack
                        .iter()
                        .chain(std::iter::once(&file))
                        .map(|p| p.display().to_string())
                        .collect();
                    bail!("include cycle: {}", chain.join(" -> "));
                }
                if directive.kind == DirectiveKind::Require && state.seen.contains(&file) {
                    debug!(?file, "already required on this page; skipping");
                    continue;
                }
                state.seen.insert(file.clone());

                let content = self.fs.read_to_string(&file)?;
                let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
                state.stack.push(file);
                let expanded = self.expand(&content, &parent, state)?;
                state.stack.pop();

                push_indented(&mut out, &expanded, directive.indent);
                if !expanded.is_empty() && !expanded.ends_with('\n') {
                    out.push_str(ending);
                }
            }
        }

        Ok(out)
    }

    /// Files a directive target refers to, sorted. Empty when nothing matches.
    fn resolve(&self, target: &str, dir: &Path) -> AnyResult<Vec<PathBuf>> {
        let bases = std::iter::once(dir).chain(self.include_paths.iter().map(PathBuf::as_path));

        if is_glob(target) {
            let pattern = [target.to_string()];
            for base in bases {
                let matches = Selector::new(base, &pattern, &[])?.select(self.fs.as_ref())?;
                if !matches.is_empty() {
                    return Ok(matches.entries().map(|(_, abs)| abs).collect());
                }
            }
            return Ok(Vec::new());
        }

        Ok(bases
            .map(|base| base.join(target))
            .find(|candidate| self.fs.is_file(candidate))
            .into_iter()
            .collect())
    }
}

impl Transform for IncludeHtml {
    fn name(&self) -> &'static str {
        "include-html"
    }

    fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        assets
            .into_iter()
            .map(|asset| {
                let text = asset.text(self.name())?;
                let dir = asset.source.parent().map(Path::to_path_buf).unwrap_or_default();
                let mut state = PageState {
                    stack: vec![asset.source.clone()],
                    seen: HashSet::new(),
                };
                let html = self
                    .expand(text, &dir, &mut state)
                    .map_err(|e| AssetflowError::transform(self.name(), &asset.source, format!("{e:#}")))?;
                Ok(asset.derive(asset.path.clone(), html))
            })
            .collect()
    }
}

fn split_ending(raw: &str) -> (&str, &str) {
    if let Some(line) = raw.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = raw.strip_suffix('\n') {
        (line, "\n")
    } else {
        (raw, "")
    }
}

fn push_indented(out: &mut String, text: &str, indent: &str) {
    for line in text.split_inclusive('\n') {
        if !indent.is_empty() && !line.trim().is_empty() {
            out.push_str(indent);
        }
        out.push_str(line);
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

fn is_glob(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}
