//! Download progress record and phase state machine

use serde::{Deserialize, Serialize};

/// Message carried by the terminal record of a cancelled download
pub const CANCELLED_MESSAGE: &str = "Download cancelled";

/// Lifecycle phase of a single download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DownloadPhase {
    #[default]
    Initial,
    Downloading,
    Completed,
    Failed,
}

impl DownloadPhase {
    /// Completed and failed downloads never change phase again
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Initial, Self::Downloading)
            | (Self::Downloading, Self::Downloading | Self::Completed | Self::Failed) => true,
            _ => false,
        }
    }
}

/// Snapshot of one download. Each emission supersedes the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub resource_id: String,
    pub total_bytes: u64,
    pub bytes_received: u64,
    pub phase: DownloadPhase,
    /// Fraction in `[0, 1]`
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DownloadProgress {
    /// Record before any transfer has been attempted
    pub fn initial(resource_id: impl Into<String>, total_bytes: u64) -> Self {
        Self {
            resource_id: resource_id.into(),
            total_bytes,
            bytes_received: 0,
            phase: DownloadPhase::Initial,
            progress: 0.0,
            error_message: None,
        }
    }

    /// Record for an in-flight transfer
    pub fn downloading(resource_id: impl Into<String>, bytes_received: u64, total_bytes: u64) -> Self {
        Self {
            resource_id: resource_id.into(),
            total_bytes,
            bytes_received,
            phase: DownloadPhase::Downloading,
            progress: fraction(bytes_received, total_bytes),
            error_message: None,
        }
    }

    /// Terminal record for a finished transfer
    pub fn completed(resource_id: impl Into<String>, total_bytes: u64) -> Self {
        Self {
            resource_id: resource_id.into(),
            total_bytes,
            bytes_received: total_bytes,
            phase: DownloadPhase::Completed,
            progress: 1.0,
            error_message: None,
        }
    }

    /// Terminal record for a failed transfer
    pub fn failed(
        resource_id: impl Into<String>,
        bytes_received: u64,
        total_bytes: u64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            total_bytes,
            bytes_received,
            phase: DownloadPhase::Failed,
            progress: fraction(bytes_received, total_bytes),
            error_message: Some(message.into()),
        }
    }

    /// Terminal record for a cancelled transfer
    pub fn cancelled(resource_id: impl Into<String>, bytes_received: u64, total_bytes: u64) -> Self {
        Self::failed(resource_id, bytes_received, total_bytes, CANCELLED_MESSAGE)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Progress as a whole percentage for display
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (self.progress * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// `received / total`, clamped to `[0, 1]`; zero while the total is unknown
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fraction(received: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (received as f64 / total as f64).clamp(0.0, 1.0)
}
