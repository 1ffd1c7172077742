#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Content digests for episode archives
//!
//! This crate provides streaming file hashing with a selectable algorithm
//! and the integrity verifier used to check downloaded archives against a
//! digest published by the origin server.

mod verify;

pub use verify::IntegrityVerifier;

use episode_errors::{Error, StorageError};
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Digest algorithm used for content hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, the digest origin servers publish
    #[default]
    Sha256,
    /// BLAKE3
    Blake3,
}

/// Length of the raw digest in bytes for every supported algorithm
pub const DIGEST_LEN: usize = 32;

impl HashAlgorithm {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(Error::internal(format!("unknown hash algorithm: {other}"))),
        }
    }
}

/// Incremental hasher over either supported algorithm
enum StreamHasher {
    Sha256(sha2::Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl StreamHasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(hasher) => hasher.update(data),
            Self::Blake3(hasher) => {
                hasher.update(data);
            }
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(hasher) => hasher.finalize().to_vec(),
            Self::Blake3(hasher) => hasher.finalize().as_bytes().to_vec(),
        }
    }
}

/// A content digest tagged with the algorithm that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl Hash {
    /// Create a hash from raw digest bytes
    #[must_use]
    pub fn from_bytes(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Convert to lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parse from hex string
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or has the wrong
    /// length for the algorithm.
    pub fn from_hex(algorithm: HashAlgorithm, s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s.trim()).map_err(|e| StorageError::CorruptedData {
            message: format!("invalid hex: {e}"),
        })?;

        if bytes.len() != DIGEST_LEN {
            return Err(StorageError::CorruptedData {
                message: format!(
                    "{algorithm} hash must be {DIGEST_LEN} bytes, got {}",
                    bytes.len()
                ),
            }
            .into());
        }

        Ok(Self::from_bytes(algorithm, bytes))
    }

    /// Compare against a hex digest, ignoring case and surrounding whitespace
    #[must_use]
    pub fn matches_hex(&self, expected: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(expected.trim())
    }

    /// Compute hash of a byte slice
    #[must_use]
    pub fn from_data(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        let mut hasher = StreamHasher::new(algorithm);
        hasher.update(data);
        Self::from_bytes(algorithm, hasher.finalize())
    }

    /// Compute hash of a file, reading it in fixed-size chunks
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(algorithm: HashAlgorithm, path: &Path) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, path))?;

        let mut hasher = StreamHasher::new(algorithm);
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_with_path(&e, path))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(Self::from_bytes(algorithm, hasher.finalize()))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sha256_known_vector() {
        let hash = Hash::from_data(HashAlgorithm::Sha256, b"hello world");
        let expected = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert_eq!(hash.to_hex(), expected);
    }

    #[test]
    fn test_blake3_known_vector() {
        let hash = Hash::from_data(HashAlgorithm::Blake3, b"hello world");
        let expected = "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24";
        assert_eq!(hash.to_hex(), expected);
    }

    #[test]
    fn test_matches_hex_is_case_insensitive() {
        let hash = Hash::from_data(HashAlgorithm::Sha256, b"hello world");
        assert!(hash.matches_hex(&hash.to_hex().to_uppercase()));
        assert!(hash.matches_hex(&format!("  {}\n", hash.to_hex())));
        assert!(!hash.matches_hex("deadbeef"));
    }

    #[test]
    fn test_from_hex_validates_length() {
        assert!(Hash::from_hex(HashAlgorithm::Sha256, "1234").is_err());
        assert!(Hash::from_hex(HashAlgorithm::Sha256, "xyz123").is_err());
        let hash = Hash::from_data(HashAlgorithm::Blake3, b"x");
        let parsed = Hash::from_hex(HashAlgorithm::Blake3, &hash.to_hex()).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[tokio::test]
    async fn test_hash_file_matches_data() {
        use std::io::Write;
        let mut temp = NamedTempFile::new().unwrap();
        // Larger than one chunk so the streaming loop runs more than once
        let data = vec![7u8; CHUNK_SIZE * 2 + 17];
        temp.write_all(&data).unwrap();

        for algorithm in [HashAlgorithm::Sha256, HashAlgorithm::Blake3] {
            let hash = Hash::hash_file(algorithm, temp.path()).await.unwrap();
            assert_eq!(hash, Hash::from_data(algorithm, &data));
        }
    }

    #[tokio::test]
    async fn test_hash_missing_file() {
        let err = Hash::hash_file(HashAlgorithm::Sha256, Path::new("/definitely/not/here"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::PathNotFound { .. })));
    }
}
