//! Archive decoding into a staging directory

use episode_errors::{Error, ExtractionError, StorageError};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

/// Decodes an archive file into a directory
///
/// Implementations are synchronous; callers run them on the blocking pool.
pub trait ArchiveDecoder: Send + Sync {
    /// Decode every entry of `archive` beneath `dest`, returning the number
    /// of entries written
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read, an entry would land
    /// outside `dest`, or writing fails.
    fn decode(&self, archive: &Path, dest: &Path) -> Result<usize, Error>;
}

/// Zip archives, streamed entry by entry from the file
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipDecoder;

impl ZipDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveDecoder for ZipDecoder {
    fn decode(&self, archive: &Path, dest: &Path) -> Result<usize, Error> {
        let file =
            File::open(archive).map_err(|e| StorageError::from_io_with_path(&e, archive))?;
        let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
            ExtractionError::new(format!("invalid archive {}: {e}", archive.display()))
        })?;

        let mut written = 0;
        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|e| ExtractionError::new(format!("unreadable archive entry {index}: {e}")))?;

            let Some(relative) = entry.enclosed_name() else {
                return Err(ExtractionError::new(format!(
                    "archive entry escapes destination: {}",
                    entry.name()
                ))
                .into());
            };
            let out_path = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path).map_err(|e| Error::io_with_path(&e, &out_path))?;
            } else {
                if let Some(parent) = out_path.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
                }
                let mut out_file =
                    File::create(&out_path).map_err(|e| Error::io_with_path(&e, &out_path))?;
                io::copy(&mut entry, &mut out_file).map_err(|e| Error::io_with_path(&e, &out_path))?;

                #[cfg(unix)]
                if let Some(mode) = entry.unix_mode() {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o7777))
                        .map_err(|e| Error::io_with_path(&e, &out_path))?;
                }
            }
            written += 1;
        }

        tracing::debug!(archive = %archive.display(), entries = written, "archive decoded");
        Ok(written)
    }
}
