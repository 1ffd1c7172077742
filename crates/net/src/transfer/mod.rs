//! Byte transfer seam used by the download orchestrator

mod http;

pub use http::HttpTransferClient;

use crate::cancel::CancelToken;
use async_trait::async_trait;
use episode_errors::Error;
use std::path::PathBuf;

/// Progress callback: `(received, total)` for the current request
///
/// `received` counts bytes written by this request only; `total` is the
/// length the server announced for this request, zero when unknown.
pub type ProgressFn<'a> = dyn Fn(u64, u64) + Send + Sync + 'a;

/// One transfer of a remote resource into a local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub url: String,
    pub destination: PathBuf,
    /// Bytes already present in `destination`; new bytes are appended
    pub start_offset: u64,
}

/// Moves bytes from a URL into a file
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Fetch `request.url` into `request.destination`
    ///
    /// Must return [`Error::Cancelled`] when `cancel` fires and should
    /// observe it while blocked on the network. A resume whose offset
    /// already covers the whole resource succeeds without writing.
    async fn fetch(
        &self,
        request: &TransferRequest,
        on_progress: &ProgressFn<'_>,
        cancel: &CancelToken,
    ) -> Result<(), Error>;
}
