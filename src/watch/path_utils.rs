// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Tries a direct `strip_prefix(root)` first, then canonicalized paths
/// (symlinked temp dirs, `/private/var` on macOS). A removed file cannot be
/// canonicalized, so its parent is canonicalized instead.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_forward(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok().or_else(|| {
        let parent = path.parent()?.canonicalize().ok()?;
        Some(parent.join(path.file_name()?))
    })?;
    path_canon.strip_prefix(&root_canon).ok().map(to_forward)
}

fn to_forward(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
