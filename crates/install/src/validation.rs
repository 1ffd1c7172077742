//! Structural validation of an extracted episode tree

use episode_config::constants::{DEFAULT_ASSETS_DIR, DEFAULT_MANIFEST_FILE};
use episode_config::InstallConfig;
use episode_errors::Error;
use episode_platform::{file_is_blank, inspect, MemberState};
use episode_types::ValidationResult;
use std::path::{Path, PathBuf};

pub(crate) const MISSING_MANIFEST: &str = "missing manifest";
pub(crate) const EMPTY_MANIFEST: &str = "manifest is empty";
pub(crate) const MISSING_ASSETS: &str = "missing images directory";

/// Checks that a tree carries the members every installed episode needs
#[derive(Debug, Clone)]
pub struct ContentValidator {
    manifest_file: String,
    assets_dir: String,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_FILE, DEFAULT_ASSETS_DIR)
    }
}

impl ContentValidator {
    pub fn new(manifest_file: impl Into<String>, assets_dir: impl Into<String>) -> Self {
        Self {
            manifest_file: manifest_file.into(),
            assets_dir: assets_dir.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &InstallConfig) -> Self {
        Self::new(config.manifest_file.clone(), config.assets_dir.clone())
    }

    /// Validate `tree`, collecting every violation
    ///
    /// Reads only. The manifest is checked for presence and non-blank
    /// content, not parsed.
    #[must_use]
    pub fn validate(&self, tree: &Path) -> ValidationResult {
        let mut errors = Vec::new();

        let manifest = tree.join(&self.manifest_file);
        match inspect(&manifest) {
            MemberState::File { .. } => match file_is_blank(&manifest) {
                Ok(true) => errors.push(EMPTY_MANIFEST.to_string()),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(path = %manifest.display(), error = %e, "manifest unreadable");
                    errors.push(MISSING_MANIFEST.to_string());
                }
            },
            _ => errors.push(MISSING_MANIFEST.to_string()),
        }

        if !inspect(&tree.join(&self.assets_dir)).is_dir() {
            errors.push(MISSING_ASSETS.to_string());
        }

        ValidationResult::from_errors(errors)
    }

    /// Run [`ContentValidator::validate`] on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task panics or is cancelled.
    pub async fn validate_in_background(&self, tree: PathBuf) -> Result<ValidationResult, Error> {
        let validator = self.clone();
        tokio::task::spawn_blocking(move || validator.validate(&tree))
            .await
            .map_err(|e| Error::internal(format!("validation task failed: {e}")))
    }
}
