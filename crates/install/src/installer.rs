//! Installer: archive to committed version directory

use crate::extract::ArchiveDecoder;
use crate::staging::StagingDirectory;
use crate::validation::ContentValidator;
use episode_config::{parse_version_dir, EpisodeLayout};
use episode_errors::{Error, ExtractionError, StorageError};
use episode_platform::FilesystemOperations;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Installs downloaded archives and manages installed versions
#[derive(Clone)]
pub struct EpisodeInstaller {
    fs: Arc<dyn FilesystemOperations>,
    decoder: Arc<dyn ArchiveDecoder>,
    validator: ContentValidator,
    layout: EpisodeLayout,
}

impl EpisodeInstaller {
    pub fn new(
        fs: Arc<dyn FilesystemOperations>,
        decoder: Arc<dyn ArchiveDecoder>,
        validator: ContentValidator,
        layout: EpisodeLayout,
    ) -> Self {
        Self {
            fs,
            decoder,
            validator,
            layout,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &EpisodeLayout {
        &self.layout
    }

    /// Install `archive_path` as `version` of `episode_id`
    ///
    /// Returns the committed version directory. Installing the same archive
    /// twice yields the same tree. On failure the staging directory is gone
    /// and no partially populated version directory exists.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if any step fails; errors from other
    /// layers travel as its cause.
    pub async fn install(
        &self,
        archive_path: &Path,
        episode_id: &str,
        version: u32,
    ) -> Result<PathBuf, ExtractionError> {
        EpisodeLayout::check_episode_id(episode_id).map_err(ExtractionError::wrap)?;

        let mut staging = StagingDirectory::new(
            self.layout.staging_path(episode_id, version),
            self.layout.final_path(episode_id, version),
        );

        tracing::info!(
            episode_id,
            version,
            archive = %archive_path.display(),
            "installing episode"
        );

        match self.stage_and_commit(archive_path, &mut staging).await {
            Ok(()) => {
                tracing::info!(episode_id, version, path = %staging.final_path().display(), "episode installed");
                Ok(staging.final_path().to_path_buf())
            }
            Err(e) => {
                staging.cleanup(self.fs.as_ref()).await;
                tracing::warn!(episode_id, version, error = %e, "install failed");
                Err(ExtractionError::wrap(e))
            }
        }
    }

    async fn stage_and_commit(
        &self,
        archive_path: &Path,
        staging: &mut StagingDirectory,
    ) -> Result<(), Error> {
        staging.prepare(self.fs.as_ref()).await?;
        tracing::debug!(path = %staging.path().display(), "staging prepared");

        let decoder = Arc::clone(&self.decoder);
        let archive = archive_path.to_path_buf();
        let dest = staging.path().to_path_buf();
        let entries = tokio::task::spawn_blocking(move || decoder.decode(&archive, &dest))
            .await
            .map_err(|e| Error::internal(format!("archive decoding task failed: {e}")))??;
        tracing::debug!(entries, "archive extracted");

        let result = self
            .validator
            .validate_in_background(staging.path().to_path_buf())
            .await?;
        if !result.is_valid {
            return Err(ExtractionError::with_cause(
                "validation failed",
                StorageError::CorruptedData {
                    message: result.summary(),
                }
                .into(),
            )
            .into());
        }
        staging.mark_validated();

        staging.commit(self.fs.as_ref()).await
    }

    /// Paths of every installed version of `episode_id`, in no particular order
    ///
    /// # Errors
    ///
    /// Returns an error if the episode directory exists but cannot be read.
    pub async fn list_installed_versions(&self, episode_id: &str) -> Result<Vec<PathBuf>, Error> {
        EpisodeLayout::check_episode_id(episode_id)?;

        let entries = self.fs.list_dir(&self.layout.episode_root(episode_id)).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.is_dir && parse_version_dir(&entry.name).is_some())
            .map(|entry| entry.path)
            .collect())
    }

    /// Installed version numbers of `episode_id`, ascending
    ///
    /// # Errors
    ///
    /// Returns an error if the episode directory exists but cannot be read.
    pub async fn installed_version_numbers(&self, episode_id: &str) -> Result<Vec<u32>, Error> {
        let mut versions: Vec<u32> = self
            .list_installed_versions(episode_id)
            .await?
            .iter()
            .filter_map(|path| path.file_name()?.to_str().and_then(parse_version_dir))
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }

    /// Remove one installed version; succeeds if it is not installed
    ///
    /// # Errors
    ///
    /// Returns an error if the version directory cannot be removed.
    pub async fn remove_version(&self, episode_id: &str, version: u32) -> Result<(), Error> {
        EpisodeLayout::check_episode_id(episode_id)?;

        let path = self.layout.final_path(episode_id, version);
        self.fs.safe_delete(&path).await?;
        tracing::info!(episode_id, version, "episode version removed");
        Ok(())
    }
}
