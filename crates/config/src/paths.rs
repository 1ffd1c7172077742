//! Platform path resolution

use crate::constants::APP_DIR;
use episode_errors::{ConfigError, Error};
use std::path::PathBuf;

/// Resolves the writable directories the pipeline works in
pub trait PathResolver: Send + Sync {
    /// Scratch directory for downloads in progress and completed archives
    fn temp_dir(&self) -> PathBuf;

    /// Per-application persistent directory that holds installed episodes
    fn support_dir(&self) -> PathBuf;
}

/// Platform default locations
#[derive(Debug, Clone)]
pub struct SystemPaths {
    temp_dir: PathBuf,
    support_dir: PathBuf,
}

impl SystemPaths {
    /// Resolve the platform temp directory and `<data_dir>/episode`
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no per-user data directory.
    pub fn new() -> Result<Self, Error> {
        let data_dir = dirs::data_dir().ok_or_else(|| ConfigError::UnresolvedDirectory {
            kind: "data".to_string(),
        })?;

        Ok(Self {
            temp_dir: std::env::temp_dir().join(APP_DIR),
            support_dir: data_dir.join(APP_DIR),
        })
    }
}

impl PathResolver for SystemPaths {
    fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone()
    }

    fn support_dir(&self) -> PathBuf {
        self.support_dir.clone()
    }
}

/// Explicit locations, used for overrides and tests
#[derive(Debug, Clone)]
pub struct FixedPaths {
    temp_dir: PathBuf,
    support_dir: PathBuf,
}

impl FixedPaths {
    pub fn new(temp_dir: impl Into<PathBuf>, support_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            support_dir: support_dir.into(),
        }
    }
}

impl PathResolver for FixedPaths {
    fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone()
    }

    fn support_dir(&self) -> PathBuf {
        self.support_dir.clone()
    }
}
