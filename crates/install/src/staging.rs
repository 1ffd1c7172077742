//! Staging directory representation and operations

use episode_errors::Error;
use episode_platform::FilesystemOperations;
use std::path::{Path, PathBuf};

/// A staging directory for one `(episode, version)` install
#[derive(Debug)]
pub struct StagingDirectory {
    path: PathBuf,
    final_path: PathBuf,
    is_validated: bool,
}

impl StagingDirectory {
    #[must_use]
    pub fn new(path: PathBuf, final_path: PathBuf) -> Self {
        Self {
            path,
            final_path,
            is_validated: false,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.is_validated
    }

    pub fn mark_validated(&mut self) {
        self.is_validated = true;
    }

    /// Replace any leftover staging directory with an empty one
    ///
    /// # Errors
    ///
    /// Returns an error if the leftover cannot be removed or the directory
    /// cannot be created.
    pub async fn prepare(&self, fs: &dyn FilesystemOperations) -> Result<(), Error> {
        fs.safe_delete(&self.path).await?;
        fs.create_dir_all(&self.path).await
    }

    /// Move staging content to the final location
    ///
    /// Any existing final directory is removed first, then the staging
    /// directory is renamed over it in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the content has not been validated, or if
    /// removing the old version or the rename fails.
    pub async fn commit(&self, fs: &dyn FilesystemOperations) -> Result<(), Error> {
        if !self.is_validated {
            return Err(Error::internal("cannot commit unvalidated staging directory"));
        }

        fs.safe_delete(&self.final_path).await?;
        fs.safe_move(&self.path, &self.final_path).await
    }

    /// Best-effort removal; failures are logged, never returned
    pub async fn cleanup(&self, fs: &dyn FilesystemOperations) {
        if let Err(e) = fs.safe_delete(&self.path).await {
            tracing::warn!(path = %self.path.display(), error = %e, "staging cleanup failed");
        }
    }
}
