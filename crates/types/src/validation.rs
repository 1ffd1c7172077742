//! Structured validation outcome for installed trees

use serde::{Deserialize, Serialize};

/// Result of validating an extracted episode tree.
///
/// `errors` is empty exactly when `is_valid` is true; construct through
/// [`ValidationResult::from_errors`] to keep the two in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// All reasons joined for log and error messages
    #[must_use]
    pub fn summary(&self) -> String {
        self.errors.join("; ")
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}
