#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for episode
//!
//! This crate owns the resumable download protocol: the HTTP client with
//! retry logic, the [`TransferClient`] seam, per-resource cancellation and
//! the [`EpisodeDownloader`] that ties them to the on-disk layout.

pub mod cancel;
mod client;
pub mod download;
pub mod transfer;
mod validation;

pub use cancel::{CancelRegistry, CancelToken, Registration};
pub use client::{NetClient, NetConfig};
pub use download::{DownloadStream, EpisodeDownloader};
pub use transfer::{HttpTransferClient, ProgressFn, TransferClient, TransferRequest};
pub use validation::validate_url;
