//! Package-related type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for one installable unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageRef {
    pub episode_id: String,
    pub version: u32,
}

impl PackageRef {
    /// Create a new package reference
    pub fn new(episode_id: impl Into<String>, version: u32) -> Self {
        Self {
            episode_id: episode_id.into(),
            version,
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.episode_id, self.version)
    }
}

/// A downloadable episode archive as advertised by the origin server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeResource {
    pub id: String,
    pub version: u32,
    /// Advertised archive size; zero when unknown
    #[serde(default)]
    pub size_bytes: u64,
    pub download_url: String,
}

impl EpisodeResource {
    pub fn new(
        id: impl Into<String>,
        version: u32,
        size_bytes: u64,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            version,
            size_bytes,
            download_url: download_url.into(),
        }
    }

    /// Identity of the package this resource installs
    #[must_use]
    pub fn package_ref(&self) -> PackageRef {
        PackageRef::new(self.id.clone(), self.version)
    }
}
