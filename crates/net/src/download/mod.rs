//! Resumable episode downloads with a progress stream
//!
//! A download writes into `<temp>/<id>_v<version>.zip.partial` and renames
//! it to `<temp>/<id>_v<version>.zip` once the transfer finishes. A partial
//! file left behind by an interrupted attempt is resumed from its length.

mod stream;

pub use stream::DownloadStream;

use crate::cancel::{CancelRegistry, CancelToken, Registration};
use crate::transfer::{TransferClient, TransferRequest};
use crate::validation::validate_url;
use episode_config::EpisodeLayout;
use episode_errors::{DownloadError, Error};
use episode_events::{DownloadProgress, ProgressEmitter, ProgressSender};
use episode_platform::FilesystemOperations;
use episode_types::EpisodeResource;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Starts, tracks and cancels episode downloads
#[derive(Clone)]
pub struct EpisodeDownloader {
    transfer: Arc<dyn TransferClient>,
    fs: Arc<dyn FilesystemOperations>,
    layout: EpisodeLayout,
    handles: CancelRegistry,
}

/// Last position reported for a download, for the terminal record
#[derive(Debug, Default)]
struct Position {
    received: AtomicU64,
    total: AtomicU64,
}

impl Position {
    fn store(&self, received: u64, total: u64) {
        self.received.store(received, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    fn load(&self) -> (u64, u64) {
        (
            self.received.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

impl EpisodeDownloader {
    pub fn new(
        transfer: Arc<dyn TransferClient>,
        fs: Arc<dyn FilesystemOperations>,
        layout: EpisodeLayout,
    ) -> Self {
        Self {
            transfer,
            fs,
            layout,
            handles: CancelRegistry::new(),
        }
    }

    #[must_use]
    pub fn layout(&self) -> &EpisodeLayout {
        &self.layout
    }

    /// Download `resource`, reporting progress through the returned stream
    ///
    /// Nothing happens until the stream is first polled. The stream ends
    /// after a `Completed` record, after a `Failed` record when the download
    /// was cancelled, or after an `Err` item carrying a [`DownloadError`].
    #[must_use]
    pub fn download(&self, resource: EpisodeResource) -> DownloadStream {
        DownloadStream::new(self.clone(), resource)
    }

    /// Cancel the active download of `resource_id`; no-op when none is active
    pub fn cancel(&self, resource_id: &str) {
        if self.handles.cancel(resource_id) {
            tracing::info!(resource_id, "download cancellation requested");
        }
    }

    #[must_use]
    pub fn is_active(&self, resource_id: &str) -> bool {
        self.handles.is_active(resource_id)
    }

    /// Where a completed download of `resource` is placed
    #[must_use]
    pub fn completed_archive_path(&self, resource: &EpisodeResource) -> PathBuf {
        self.layout.archive_path(&resource.id, resource.version)
    }

    /// Remove every temp-dir entry whose name contains `episode_id`
    ///
    /// Best-effort: failures are logged and skipped. Returns how many
    /// entries were removed.
    pub async fn cleanup_temp_files(&self, episode_id: &str) -> usize {
        if episode_id.is_empty() {
            return 0;
        }

        let entries = match self.fs.list_dir(self.layout.temp_dir()).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(episode_id, error = %e, "could not list temp directory");
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.iter().filter(|e| e.name.contains(episode_id)) {
            match self.fs.safe_delete(&entry.path).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), error = %e, "temp cleanup failed");
                }
            }
        }

        tracing::debug!(episode_id, removed, "temp files cleaned");
        removed
    }

    fn register(&self, resource_id: &str) -> Registration {
        self.handles.register(resource_id)
    }

    /// Drive one download to its terminal item
    async fn run(self, resource: EpisodeResource, registration: Registration, tx: ProgressSender) {
        let position = Position::default();
        let outcome = self
            .transfer_resource(&resource, registration.token(), &tx, &position)
            .await;

        // Deregister before the terminal item reaches the consumer
        drop(registration);

        let id = resource.id.as_str();
        match outcome {
            Ok(total) => {
                tracing::info!(resource_id = id, bytes = total, "download completed");
                tx.emit_progress(DownloadProgress::completed(id, total));
            }
            Err(e) if e.is_cancelled() => {
                let (received, total) = position.load();
                tracing::info!(resource_id = id, received, "download cancelled");
                tx.emit_progress(DownloadProgress::cancelled(id, received, total));
            }
            Err(e) => {
                tracing::warn!(resource_id = id, error = %e, "download failed");
                tx.emit_failure(DownloadError::new(id, e).into());
            }
        }
    }

    async fn transfer_resource(
        &self,
        resource: &EpisodeResource,
        cancel: &CancelToken,
        tx: &ProgressSender,
        position: &Position,
    ) -> Result<u64, Error> {
        let id = resource.id.as_str();
        let advertised = resource.size_bytes;

        position.store(0, advertised);
        tx.emit_progress(DownloadProgress::downloading(id, 0, advertised));

        EpisodeLayout::check_episode_id(id)?;
        validate_url(&resource.download_url)?;

        let partial_path = self.layout.partial_path(id, resource.version);
        let completed_path = self.layout.archive_path(id, resource.version);
        self.fs.create_dir_all(self.layout.temp_dir()).await?;

        let existing = self.fs.file_len(&partial_path).await?.unwrap_or(0);
        if existing > 0 {
            tracing::info!(resource_id = id, offset = existing, "resuming download");
            position.store(existing, advertised);
            tx.emit_progress(DownloadProgress::downloading(id, existing, advertised));
        } else {
            tracing::info!(resource_id = id, url = %resource.download_url, "starting download");
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if advertised > 0 && existing >= advertised {
            tracing::info!(resource_id = id, bytes = existing, "partial file already complete");
        } else {
            let request = TransferRequest {
                url: resource.download_url.clone(),
                destination: partial_path.clone(),
                start_offset: existing,
            };
            self.fetch_remaining(id, &request, cancel, tx, position)
                .await?;
        }

        self.fs.safe_move(&partial_path, &completed_path).await?;

        let (received, _) = position.load();
        let size = self
            .fs
            .file_len(&completed_path)
            .await?
            .unwrap_or(received);
        Ok(size)
    }

    /// Run the transfer, reporting positions that include the resumed bytes
    async fn fetch_remaining(
        &self,
        id: &str,
        request: &TransferRequest,
        cancel: &CancelToken,
        tx: &ProgressSender,
        position: &Position,
    ) -> Result<(), Error> {
        let existing = request.start_offset;
        let on_progress = |received: u64, total: u64| {
            let total_received = existing + received;
            // Unknown length stays unknown rather than pretending to be `existing`
            let adjusted_total = if total == 0 { 0 } else { existing + total };
            position.store(total_received, adjusted_total);
            tx.emit_progress(DownloadProgress::downloading(
                id,
                total_received,
                adjusted_total,
            ));
        };
        self.transfer.fetch(request, &on_progress, cancel).await
    }
}
