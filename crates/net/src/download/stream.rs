//! Lazily started progress stream

use super::EpisodeDownloader;
use crate::cancel::CancelToken;
use episode_errors::{DownloadError, Error};
use episode_events::{ProgressItem, ProgressReceiver};
use episode_types::EpisodeResource;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Progress of one download
///
/// The download task is spawned on first poll. Dropping the stream before
/// its terminal item cancels the download. A task that dies without a
/// terminal item still ends the stream with a [`DownloadError`].
pub struct DownloadStream {
    resource_id: String,
    pending: Option<(EpisodeDownloader, EpisodeResource)>,
    receiver: Option<ProgressReceiver>,
    token: Option<CancelToken>,
    finished: bool,
}

impl DownloadStream {
    pub(super) fn new(downloader: EpisodeDownloader, resource: EpisodeResource) -> Self {
        Self {
            resource_id: resource.id.clone(),
            pending: Some((downloader, resource)),
            receiver: None,
            token: None,
            finished: false,
        }
    }

    fn start(&mut self, downloader: EpisodeDownloader, resource: EpisodeResource) {
        let (tx, rx) = episode_events::channel();
        let registration = downloader.register(&resource.id);
        self.token = Some(registration.token().clone());
        self.receiver = Some(rx);
        tokio::spawn(downloader.run(resource, registration, tx));
    }
}

impl Stream for DownloadStream {
    type Item = ProgressItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some((downloader, resource)) = this.pending.take() {
            this.start(downloader, resource);
        }

        let Some(receiver) = this.receiver.as_mut() else {
            return Poll::Ready(None);
        };

        match receiver.poll_recv(cx) {
            Poll::Ready(Some(item)) => {
                let terminal = match &item {
                    Ok(progress) => progress.is_terminal(),
                    Err(_) => true,
                };
                if terminal {
                    this.finished = true;
                }
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => {
                this.receiver = None;
                if this.finished {
                    return Poll::Ready(None);
                }

                this.finished = true;
                tracing::error!(resource_id = %this.resource_id, "download task ended early");
                let cause = Error::internal("download task ended without a final record");
                Poll::Ready(Some(Err(
                    DownloadError::new(this.resource_id.clone(), cause).into()
                )))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for DownloadStream {
    fn drop(&mut self) {
        if !self.finished {
            if let Some(token) = &self.token {
                token.cancel();
            }
        }
    }
}
