//! Fixed names that make up the on-disk layout
//!
//! These are format surface shared with other tools reading the same support
//! directory, so only the staging prefix and tree member names are exposed
//! through configuration.

/// Application directory name under the platform config/data directories
pub const APP_DIR: &str = "episode";

/// Directory under the support directory that holds every episode
pub const EPISODES_DIR: &str = "episodes";

/// Prefix of the `v<version>` segment naming an installed version
pub const VERSION_MARKER: &str = "v";

pub const DEFAULT_STAGING_PREFIX: &str = "staging";
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";
pub const DEFAULT_ASSETS_DIR: &str = "images";

pub const ARCHIVE_EXTENSION: &str = "zip";
pub const PARTIAL_EXTENSION: &str = "partial";

pub const CONFIG_FILE: &str = "config.toml";
