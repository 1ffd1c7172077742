//! Extraction and install error types

use std::borrow::Cow;

use crate::{Error, UserFacingError};

/// Failure while staging, decoding, validating or committing an install.
///
/// Whenever this error is returned the staging directory has already been
/// removed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("extraction failed: {message}")]
pub struct ExtractionError {
    pub message: String,
    #[source]
    pub cause: Option<Box<Error>>,
}

impl ExtractionError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(message: impl Into<String>, cause: Error) -> Self {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Wrap an arbitrary error, passing an `ExtractionError` through unchanged
    #[must_use]
    pub fn wrap(err: Error) -> Self {
        match err {
            Error::Extraction(inner) => inner,
            other => Self::with_cause(other.to_string(), other),
        }
    }
}

impl UserFacingError for ExtractionError {
    fn user_message(&self) -> Cow<'_, str> {
        match &self.cause {
            Some(cause) if cause.to_string() != self.message => {
                Cow::Owned(format!("{self}: {cause}"))
            }
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        if self.message == "validation failed" {
            Some("The archive is missing required content; download it again or contact the publisher.")
        } else {
            None
        }
    }

    fn is_retryable(&self) -> bool {
        self.cause.as_ref().is_some_and(|cause| cause.is_retryable())
    }

    fn user_code(&self) -> Option<&'static str> {
        Some("install.extraction_failed")
    }
}
