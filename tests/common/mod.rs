//! Shared environment for end-to-end pipeline tests

use episode_config::{EpisodeLayout, FixedPaths};
use episode_errors::Error;
use episode_events::{DownloadPhase, DownloadProgress};
use episode_hash::IntegrityVerifier;
use episode_install::{ContentValidator, EpisodeInstaller, ZipDecoder};
use episode_net::{DownloadStream, EpisodeDownloader, HttpTransferClient, NetClient, NetConfig};
use episode_platform::LocalFilesystem;
use futures::StreamExt;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Scratch support and temp directories with every component wired to them
pub struct TestEnvironment {
    _temp: TempDir,
    pub layout: EpisodeLayout,
    pub downloader: EpisodeDownloader,
    pub installer: EpisodeInstaller,
    pub verifier: IntegrityVerifier,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let paths = FixedPaths::new(temp.path().join("tmp"), temp.path().join("support"));
        let layout = EpisodeLayout::with_defaults(&paths);
        let fs = Arc::new(LocalFilesystem::new());

        let config = NetConfig {
            retry_count: 0,
            chunk_timeout: Duration::from_secs(5),
            ..NetConfig::default()
        };
        let transfer = Arc::new(HttpTransferClient::new(NetClient::new(config).unwrap()));

        Self {
            downloader: EpisodeDownloader::new(transfer, fs.clone(), layout.clone()),
            installer: EpisodeInstaller::new(
                fs,
                Arc::new(ZipDecoder::new()),
                ContentValidator::default(),
                layout.clone(),
            ),
            verifier: IntegrityVerifier::default(),
            layout,
            _temp: temp,
        }
    }
}

/// In-memory zip archive of an episode with `frames` images
pub fn episode_archive(title: &str, frames: usize) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("manifest.json", options).unwrap();
    write!(zip, r#"{{"title":"{title}","frames":{frames}}}"#).unwrap();
    zip.add_directory("images/", options).unwrap();
    for frame in 0..frames {
        zip.start_file(format!("images/{frame:03}.png"), options)
            .unwrap();
        let fill = u8::try_from(frame % 251).unwrap();
        zip.write_all(&[fill; 512]).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// Drain a download stream, failing the test if it hangs
pub async fn drain(stream: DownloadStream) -> Vec<Result<DownloadProgress, Error>> {
    tokio::time::timeout(Duration::from_secs(10), stream.collect())
        .await
        .unwrap()
}

/// Unwrap every item of a finished download and check it completed
pub fn completed_records(items: Vec<Result<DownloadProgress, Error>>) -> Vec<DownloadProgress> {
    let records: Vec<_> = items.into_iter().map(Result::unwrap).collect();
    assert_eq!(records.last().unwrap().phase, DownloadPhase::Completed);
    records
}
