use std::path::{Path, PathBuf};

use crate::utils;

/// Scoped ownership of one invocation's downloaded media file.
///
/// Reserving only computes a unique path; nothing is created on disk until the fetcher writes
/// to it. The file is removed by [`TemporaryMediaFile::release`] or, if the owning future is
/// dropped first, by `Drop`. Removal failures are logged and never surface as errors.
#[derive(Debug)]
pub struct TemporaryMediaFile {
    path: PathBuf,
    released: bool,
}

impl TemporaryMediaFile {
    pub fn reserve(dir: &Path, extension: &str) -> Self {
        let path = dir.join(utils::generate_unique_filename("media", extension));
        Self {
            path,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn release(mut self) {
        self.released = true;
        match fs_err::tokio::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed temporary media file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, "Failed to remove temporary media file"),
        }
    }
}

impl Drop for TemporaryMediaFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match fs_err::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed abandoned media file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, "Failed to remove abandoned media file"),
        }
    }
}
