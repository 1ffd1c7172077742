#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for episode
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/episode/config.toml)
//! - Environment variables
//! - CLI flags
//!
//! It also owns the on-disk layout of installed episodes and downloads.

pub mod constants;
pub mod layout;
pub mod paths;

pub use layout::{parse_version_dir, version_dir_name, EpisodeLayout};
pub use paths::{FixedPaths, PathResolver, SystemPaths};

use episode_errors::{ConfigError, Error};
use episode_hash::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Directory overrides; unset entries fall back to platform defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub support_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
}

/// Installation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_staging_prefix")]
    pub staging_prefix: String,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds until response headers arrive
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_chunk_timeout")]
    pub chunk_timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            staging_prefix: default_staging_prefix(),
            manifest_file: default_manifest_file(),
            assets_dir: default_assets_dir(),
            hash_algorithm: HashAlgorithm::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            chunk_timeout: default_chunk_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
            user_agent: None,
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    #[must_use]
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_timeout)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }
}

fn default_staging_prefix() -> String {
    constants::DEFAULT_STAGING_PREFIX.to_string()
}

fn default_manifest_file() -> String {
    constants::DEFAULT_MANIFEST_FILE.to_string()
}

fn default_assets_dir() -> String {
    constants::DEFAULT_ASSETS_DIR.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_chunk_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR)
            .join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from the default location, or defaults if absent
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if fs::try_exists(&config_path).await.unwrap_or(false) {
            tracing::debug!(path = %config_path.display(), "loading config");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path if given, otherwise from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[allow(clippy::ref_option)]
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // EPISODE_SUPPORT_DIR
        if let Ok(dir) = std::env::var("EPISODE_SUPPORT_DIR") {
            self.paths.support_dir = Some(PathBuf::from(dir));
        }

        // EPISODE_TEMP_DIR
        if let Ok(dir) = std::env::var("EPISODE_TEMP_DIR") {
            self.paths.temp_dir = Some(PathBuf::from(dir));
        }

        // EPISODE_NETWORK_TIMEOUT
        if let Ok(timeout) = std::env::var("EPISODE_NETWORK_TIMEOUT") {
            self.network.timeout = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "EPISODE_NETWORK_TIMEOUT".to_string(),
                value: timeout,
            })?;
        }

        // EPISODE_NETWORK_RETRIES
        if let Ok(retries) = std::env::var("EPISODE_NETWORK_RETRIES") {
            self.network.retries = retries.parse().map_err(|_| ConfigError::InvalidValue {
                field: "EPISODE_NETWORK_RETRIES".to_string(),
                value: retries,
            })?;
        }

        // EPISODE_HASH_ALGORITHM
        if let Ok(algorithm) = std::env::var("EPISODE_HASH_ALGORITHM") {
            self.install.hash_algorithm =
                algorithm.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "EPISODE_HASH_ALGORITHM".to_string(),
                    value: algorithm,
                })?;
        }

        Ok(())
    }

    /// Resolve working directories, honoring any configured overrides
    ///
    /// # Errors
    ///
    /// Returns an error if a directory without an override cannot be resolved
    /// on this platform.
    pub fn path_resolver(&self) -> Result<Arc<dyn PathResolver>, Error> {
        if let (Some(temp), Some(support)) = (&self.paths.temp_dir, &self.paths.support_dir) {
            return Ok(Arc::new(FixedPaths::new(temp, support)));
        }

        let system = SystemPaths::new()?;
        let temp = self
            .paths
            .temp_dir
            .clone()
            .unwrap_or_else(|| system.temp_dir());
        let support = self
            .paths
            .support_dir
            .clone()
            .unwrap_or_else(|| system.support_dir());
        Ok(Arc::new(FixedPaths::new(temp, support)))
    }

    /// Layout rooted at the resolved directories with the configured prefix
    ///
    /// # Errors
    ///
    /// Returns an error if the working directories cannot be resolved.
    pub fn layout(&self) -> Result<EpisodeLayout, Error> {
        let resolver = self.path_resolver()?;
        Ok(EpisodeLayout::new(
            resolver.as_ref(),
            self.install.staging_prefix.clone(),
        ))
    }
}
