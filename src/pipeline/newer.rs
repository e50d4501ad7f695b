// src/pipeline/newer.rs

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;

/// "Newer-only" policy: skip a source whose output already exists at the
/// destination with a modification time at least as recent as the source.
///
/// The output name is the source's relative path, optionally with its
/// extension replaced (`cat.png` -> `cat.avif`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewerOnly {
    extension: Option<String>,
}

impl NewerOnly {
    /// Compare against a destination file with the same relative path.
    pub fn same_name() -> Self {
        Self { extension: None }
    }

    /// Compare against `<stem>.<ext>` in the destination.
    pub fn with_extension(ext: impl Into<String>) -> Self {
        Self {
            extension: Some(ext.into()),
        }
    }

    pub fn target_for(&self, rel: &Path) -> PathBuf {
        match &self.extension {
            Some(ext) => rel.with_extension(ext),
            None => rel.to_path_buf(),
        }
    }

    /// True if the destination output is at least as new as `source`.
    ///
    /// Any stat failure (most commonly a missing output) counts as stale.
    pub fn is_up_to_date(
        &self,
        fs: &dyn FileSystem,
        source: &Path,
        destination: &Path,
        rel: &Path,
    ) -> bool {
        let target = destination.join(self.target_for(rel));
        match (fs.modified(&target), fs.modified(source)) {
            (Ok(out), Ok(src)) => out >= src,
            _ => false,
        }
    }
}
