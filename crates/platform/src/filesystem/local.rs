//! `tokio::fs` implementation of filesystem operations

use async_trait::async_trait;
use episode_errors::{Error, StorageError};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use super::{DirEntryInfo, FilesystemOperations};

/// Filesystem operations against the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn storage_error(err: &std::io::Error, path: &Path) -> Error {
    StorageError::from_io_with_path(err, path).into()
}

#[async_trait]
impl FilesystemOperations for LocalFilesystem {
    async fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| storage_error(&e, path))
    }

    async fn safe_delete(&self, path: &Path) -> Result<(), Error> {
        // symlink_metadata so a link is removed rather than followed
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(storage_error(&e, path)),
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };

        match result {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted");
                Ok(())
            }
            // Lost a race with another deleter
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&e, path)),
        }
    }

    async fn safe_move(&self, src: &Path, dst: &Path) -> Result<(), Error> {
        fs::rename(src, dst).await.map_err(|e| {
            StorageError::AtomicRenameFailed {
                message: format!("{} -> {}: {e}", src.display(), dst.display()),
            }
            .into()
        })
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn file_len(&self, path: &Path) -> Result<Option<u64>, Error> {
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len())),
            Ok(_) => Err(StorageError::InvalidPath {
                path: path.display().to_string(),
            }
            .into()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&e, path)),
        }
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>, Error> {
        let mut entries = match fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error(&e, path)),
        };

        let mut listed = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error(&e, path))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| storage_error(&e, &entry.path()))?;
            listed.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                is_dir: file_type.is_dir(),
            });
        }
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_safe_delete_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let tree = temp.path().join("tree");
        fs::create_dir_all(tree.join("nested")).await.unwrap();
        fs::write(tree.join("nested/file"), b"x").await.unwrap();

        let filesystem = LocalFilesystem::new();
        filesystem.safe_delete(&tree).await.unwrap();
        assert!(!filesystem.exists(&tree).await);
        filesystem.safe_delete(&tree).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_len() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("data.partial");
        let filesystem = LocalFilesystem::new();

        assert_eq!(filesystem.file_len(&file).await.unwrap(), None);
        fs::write(&file, vec![0u8; 42]).await.unwrap();
        assert_eq!(filesystem.file_len(&file).await.unwrap(), Some(42));
        assert!(filesystem.file_len(temp.path()).await.is_err());
    }
}
