//! Uniquely named scratch artifacts with guaranteed cleanup.
//!
//! Candidate sources are written through `tempfile::NamedTempFile` (deleted
//! when the façade drops it). Result artifacts are created by the child
//! process, so the parent side holds a [`ResultArtifact`] guard that removes
//! the file on drop, on every exit path including early returns.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// RAII guard for a result file exchanged with the runner process.
///
/// The path is unique per evaluation call, so concurrent evaluations never
/// collide. The file may or may not exist when the guard drops; removal
/// errors are ignored because there is nothing useful to do with them.
#[derive(Debug)]
pub struct ResultArtifact {
    path: PathBuf,
}

impl ResultArtifact {
    /// Reserve a unique result path under `dir`.
    pub fn reserve(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("heisenbox-result-{}.json", Uuid::new_v4())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the child actually produced the file.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Drop for ResultArtifact {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
