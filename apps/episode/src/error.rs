//! CLI error handling

use std::fmt;

use episode_errors::UserFacingError;
use episode_types::ValidationResult;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(episode_errors::ConfigError),
    /// Pipeline error
    Ops(episode_errors::Error),
    /// Tree failed content validation
    Invalid(ValidationResult),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Invalid(result) => write!(f, "Invalid content: {}", result.summary()),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Invalid(_) => None,
        }
    }
}

impl From<episode_errors::ConfigError> for CliError {
    fn from(e: episode_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<episode_errors::Error> for CliError {
    fn from(e: episode_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<episode_errors::ExtractionError> for CliError {
    fn from(e: episode_errors::ExtractionError) -> Self {
        CliError::Ops(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
