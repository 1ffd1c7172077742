//! Integrity verification error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Sentinel digest reported when the file to verify does not exist
pub const FILE_NOT_FOUND: &str = "FILE_NOT_FOUND";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checksum mismatch: expected {expected}, got {actual}")]
pub struct VerificationError {
    pub expected: String,
    pub actual: String,
}

impl VerificationError {
    #[must_use]
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    #[must_use]
    pub fn file_not_found(expected: impl Into<String>) -> Self {
        Self::new(expected, FILE_NOT_FOUND)
    }

    /// Whether the verified file was absent rather than mismatched
    #[must_use]
    pub fn is_missing_file(&self) -> bool {
        self.actual == FILE_NOT_FOUND
    }
}

impl UserFacingError for VerificationError {
    fn user_message(&self) -> Cow<'_, str> {
        if self.is_missing_file() {
            Cow::Borrowed("file to verify does not exist")
        } else {
            Cow::Owned(self.to_string())
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        if self.is_missing_file() {
            Some("Download the archive before verifying it.")
        } else {
            Some("The file is corrupted or was tampered with; delete it and download again.")
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some("verification.checksum_mismatch")
    }
}
