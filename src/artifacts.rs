//! Scoped ownership of the files a run creates.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Guard that removes its tracked files when dropped.
///
/// Paths are tracked before the file is created, so a stage that fails
/// half-way still gets cleaned up. [`retain`](ArtifactSet::retain) disarms
/// the guard.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    paths: Vec<PathBuf>,
    retained: bool,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `path` for removal and hand it back.
    pub fn track(&mut self, path: impl Into<PathBuf>) -> &Path {
        let path = path.into();
        let index = match self.paths.iter().position(|p| *p == path) {
            Some(index) => index,
            None => {
                self.paths.push(path);
                self.paths.len() - 1
            }
        };
        &self.paths[index]
    }

    /// Tracked paths in registration order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Keep every tracked file on drop and return the ones that exist.
    pub fn retain(&mut self) -> Vec<PathBuf> {
        self.retained = true;
        self.paths.iter().filter(|p| p.exists()).cloned().collect()
    }

    pub fn is_retained(&self) -> bool {
        self.retained
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        if self.retained {
            tracing::info!(files = self.paths.len(), "artifacts retained");
            return;
        }
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "artifact removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove artifact")
                }
            }
        }
    }
}
