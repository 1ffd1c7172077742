//! Integrity verification of downloaded files

use crate::{Hash, HashAlgorithm};
use episode_errors::{Error, VerificationError};
use std::path::Path;
use tracing::debug;

/// Checks files against digests published by the origin server
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityVerifier {
    algorithm: HashAlgorithm,
}

impl IntegrityVerifier {
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Compute the hex digest of a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub async fn digest(&self, path: &Path) -> Result<String, Error> {
        Ok(Hash::hash_file(self.algorithm, path).await?.to_hex())
    }

    /// Verify that `path` hashes to `expected` (hex, any case).
    ///
    /// A missing file fails with the [`episode_errors::FILE_NOT_FOUND`]
    /// sentinel as the actual digest and is never read.
    ///
    /// # Errors
    /// Returns [`VerificationError`] on mismatch or missing file, and an I/O
    /// error if the file exists but cannot be read.
    pub async fn verify(&self, path: &Path, expected: &str) -> Result<(), Error> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(VerificationError::file_not_found(expected).into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VerificationError::file_not_found(expected).into());
            }
            Err(e) => return Err(Error::io_with_path(&e, path)),
        }

        let actual = Hash::hash_file(self.algorithm, path).await?;
        debug!(
            path = %path.display(),
            algorithm = %self.algorithm,
            actual = %actual.to_hex(),
            "computed digest"
        );

        if actual.matches_hex(expected) {
            Ok(())
        } else {
            Err(VerificationError::new(expected, actual.to_hex()).into())
        }
    }
}
