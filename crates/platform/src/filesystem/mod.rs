//! Async filesystem operations

mod local;

pub use local::LocalFilesystem;

use async_trait::async_trait;
use episode_errors::Error;
use std::path::{Path, PathBuf};

/// Entry returned by [`FilesystemOperations::list_dir`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Filesystem operations used by the download and install orchestrators
#[async_trait]
pub trait FilesystemOperations: Send + Sync {
    /// Create directory and all parent directories
    async fn create_dir_all(&self, path: &Path) -> Result<(), Error>;

    /// Remove a file or a directory tree; succeeds when the path is absent
    async fn safe_delete(&self, path: &Path) -> Result<(), Error>;

    /// Rename `src` to `dst` in a single step
    ///
    /// Both paths must be on the same filesystem. `dst` must not be a
    /// non-empty directory.
    async fn safe_move(&self, src: &Path, dst: &Path) -> Result<(), Error>;

    /// Check if a path exists
    async fn exists(&self, path: &Path) -> bool;

    /// Length of a regular file, `None` when absent
    async fn file_len(&self, path: &Path) -> Result<Option<u64>, Error>;

    /// Immediate children of a directory, empty when the directory is absent
    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>, Error>;
}
