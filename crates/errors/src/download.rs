//! Download orchestration error types

use std::borrow::Cow;

use crate::{Error, UserFacingError};

/// A non-cancellation failure while downloading one resource.
///
/// Cancellation never produces this error; it ends the progress sequence
/// with a failed record instead.
#[derive(Debug, Clone, thiserror::Error)]
#[error("download of {resource_id} failed: {cause}")]
pub struct DownloadError {
    pub resource_id: String,
    #[source]
    pub cause: Box<Error>,
}

impl DownloadError {
    #[must_use]
    pub fn new(resource_id: impl Into<String>, cause: Error) -> Self {
        Self {
            resource_id: resource_id.into(),
            cause: Box::new(cause),
        }
    }
}

impl UserFacingError for DownloadError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "download of {} failed: {}",
            self.resource_id,
            self.cause.user_message()
        ))
    }

    fn user_hint(&self) -> Option<&'static str> {
        self.cause
            .user_hint()
            .or(Some("Run the download again; it resumes from the partial file."))
    }

    fn is_retryable(&self) -> bool {
        self.cause.is_retryable()
    }

    fn user_code(&self) -> Option<&'static str> {
        Some("download.failed")
    }
}
