#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Progress events for asynchronous episode downloads
//!
//! Downloads run on their own task and report an ordered, terminating
//! sequence of [`DownloadProgress`] records over an unbounded channel. A
//! non-cancellation failure travels as the last item of the sequence in the
//! `Err` position.

pub mod download;

pub use download::{DownloadPhase, DownloadProgress, CANCELLED_MESSAGE};

use episode_errors::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// One item of a progress sequence
pub type ProgressItem = Result<DownloadProgress, Error>;

/// Type alias for the sending half of a progress sequence
pub type ProgressSender = UnboundedSender<ProgressItem>;

/// Type alias for the receiving half of a progress sequence
pub type ProgressReceiver = UnboundedReceiver<ProgressItem>;

/// Create a new progress channel
#[must_use]
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Emission helpers for anything that can reach a progress sender
pub trait ProgressEmitter {
    /// Get the progress sender for this emitter
    fn progress_sender(&self) -> &ProgressSender;

    /// Emit a progress record
    fn emit_progress(&self, progress: DownloadProgress) {
        // Ignore send errors - if the consumer went away we just continue
        let _ = self.progress_sender().send(Ok(progress));
    }

    /// Emit a failure as the final item of the sequence
    fn emit_failure(&self, error: Error) {
        let _ = self.progress_sender().send(Err(error));
    }
}

impl ProgressEmitter for ProgressSender {
    fn progress_sender(&self) -> &ProgressSender {
        self
    }
}
