//! HTTP transfer over reqwest with range resume

use super::{ProgressFn, TransferClient, TransferRequest};
use crate::cancel::CancelToken;
use crate::client::NetClient;
use crate::validation::{range_already_satisfied, validate_response};
use async_trait::async_trait;
use episode_errors::{Error, NetworkError, StorageError};
use futures::StreamExt;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Production transfer client
#[derive(Clone)]
pub struct HttpTransferClient {
    client: NetClient,
    chunk_timeout: Duration,
}

impl HttpTransferClient {
    #[must_use]
    pub fn new(client: NetClient) -> Self {
        let chunk_timeout = client.config().chunk_timeout;
        Self {
            client,
            chunk_timeout,
        }
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, Error> {
        Ok(Self::new(NetClient::with_defaults()?))
    }

    async fn open_destination(request: &TransferRequest) -> Result<File, Error> {
        let opened = if request.start_offset > 0 {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&request.destination)
                .await
        } else {
            File::create(&request.destination).await
        };
        opened.map_err(|e| StorageError::from_io_with_path(&e, &request.destination).into())
    }
}

#[async_trait]
impl TransferClient for HttpTransferClient {
    async fn fetch(
        &self,
        request: &TransferRequest,
        on_progress: &ProgressFn<'_>,
        cancel: &CancelToken,
    ) -> Result<(), Error> {
        let url = request.url.as_str();
        let is_resume = request.start_offset > 0;

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            response = self.client.get_from_offset(url, request.start_offset) => response?,
        };
        if is_resume && range_already_satisfied(&response, request.start_offset) {
            tracing::debug!(url, offset = request.start_offset, "nothing left to transfer");
            return Ok(());
        }
        validate_response(&response, url, is_resume)?;

        let total = response.content_length().unwrap_or(0);
        tracing::debug!(url, offset = request.start_offset, total, "transfer started");

        let mut file = Self::open_destination(request).await?;
        let mut stream = response.bytes_stream();
        let mut received = 0u64;

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    // Keep what arrived so the next attempt resumes from it
                    file.flush().await?;
                    return Err(Error::Cancelled);
                }
                next = tokio::time::timeout(self.chunk_timeout, stream.next()) => next,
            };

            match next {
                Ok(Some(chunk)) => {
                    let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
                    file.write_all(&chunk)
                        .await
                        .map_err(|e| Error::io_with_path(&e, &request.destination))?;
                    received += chunk.len() as u64;
                    on_progress(received, total);
                }
                Ok(None) => break,
                Err(_) => {
                    file.flush().await?;
                    return Err(NetworkError::Timeout {
                        url: url.to_string(),
                    }
                    .into());
                }
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}
