// src/pipeline/output.rs

use std::path::Path;

use anyhow::Result;
use tracing::trace;

use crate::fs::FileSystem;

/// Result of a single output write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The destination already held identical bytes.
    Unchanged,
}

/// blake3 digest of a byte buffer, hex encoded.
pub fn content_digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Write `contents` to `path` unless the file already holds the same bytes.
///
/// Skipping identical writes keeps the destination mtime stable, so
/// newer-only checks, file watchers and reload notifications don't see
/// phantom changes.
pub fn write_if_changed(fs: &dyn FileSystem, path: &Path, contents: &[u8]) -> Result<WriteOutcome> {
    if fs.is_file(path) {
        let existing = fs.read(path)?;
        if existing.len() == contents.len() && blake3::hash(&existing) == blake3::hash(contents) {
            trace!(?path, "output unchanged; skipping write");
            return Ok(WriteOutcome::Unchanged);
        }
    }
    fs.write(path, contents)?;
    Ok(WriteOutcome::Written)
}
