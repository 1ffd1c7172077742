//! On-disk layout of installed episodes and downloads
//!
//! ```text
//! <support>/episodes/<id>/v<version>/                 installed
//! <support>/episodes/<id>/<staging>_v<version>/       install in progress
//! <temp>/<id>_v<version>.zip                          downloaded archive
//! <temp>/<id>_v<version>.zip.partial                  download in progress
//! ```

use crate::constants::{
    ARCHIVE_EXTENSION, DEFAULT_STAGING_PREFIX, EPISODES_DIR, PARTIAL_EXTENSION, VERSION_MARKER,
};
use crate::paths::PathResolver;
use episode_errors::{Error, StorageError};
use std::path::{Path, PathBuf};

/// Deterministic path computation for `(episode_id, version)` pairs
#[derive(Debug, Clone)]
pub struct EpisodeLayout {
    episodes_root: PathBuf,
    temp_dir: PathBuf,
    staging_prefix: String,
}

impl EpisodeLayout {
    pub fn new(resolver: &dyn PathResolver, staging_prefix: impl Into<String>) -> Self {
        Self {
            episodes_root: resolver.support_dir().join(EPISODES_DIR),
            temp_dir: resolver.temp_dir(),
            staging_prefix: staging_prefix.into(),
        }
    }

    /// Layout with the default staging prefix
    pub fn with_defaults(resolver: &dyn PathResolver) -> Self {
        Self::new(resolver, DEFAULT_STAGING_PREFIX)
    }

    #[must_use]
    pub fn episodes_root(&self) -> &Path {
        &self.episodes_root
    }

    #[must_use]
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    #[must_use]
    pub fn staging_prefix(&self) -> &str {
        &self.staging_prefix
    }

    #[must_use]
    pub fn episode_root(&self, episode_id: &str) -> PathBuf {
        self.episodes_root.join(episode_id)
    }

    /// Directory of a committed install
    #[must_use]
    pub fn final_path(&self, episode_id: &str, version: u32) -> PathBuf {
        self.episode_root(episode_id)
            .join(version_dir_name(version))
    }

    /// Transient directory an install is extracted into before commit
    #[must_use]
    pub fn staging_path(&self, episode_id: &str, version: u32) -> PathBuf {
        self.episode_root(episode_id).join(format!(
            "{}_{}",
            self.staging_prefix,
            version_dir_name(version)
        ))
    }

    /// Completed download archive
    #[must_use]
    pub fn archive_path(&self, episode_id: &str, version: u32) -> PathBuf {
        self.temp_dir
            .join(format!("{episode_id}_v{version}.{ARCHIVE_EXTENSION}"))
    }

    /// Download still being written
    #[must_use]
    pub fn partial_path(&self, episode_id: &str, version: u32) -> PathBuf {
        self.temp_dir.join(format!(
            "{episode_id}_v{version}.{ARCHIVE_EXTENSION}.{PARTIAL_EXTENSION}"
        ))
    }

    /// Reject ids that would escape their episode directory
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, a dot segment, or contains a path
    /// separator.
    pub fn check_episode_id(episode_id: &str) -> Result<(), Error> {
        let invalid = episode_id.is_empty()
            || episode_id == "."
            || episode_id == ".."
            || episode_id.contains(['/', '\\'])
            || episode_id.contains('\0');

        if invalid {
            return Err(StorageError::InvalidPath {
                path: episode_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// `v<version>`
#[must_use]
pub fn version_dir_name(version: u32) -> String {
    format!("{VERSION_MARKER}{version}")
}

/// Parse a directory name of the form `v<digits>`
#[must_use]
pub fn parse_version_dir(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(VERSION_MARKER)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
