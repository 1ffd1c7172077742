//! Wiring of pipeline components from configuration

use crate::error::CliError;
use episode_config::Config;
use episode_hash::IntegrityVerifier;
use episode_install::{ContentValidator, EpisodeInstaller, ZipDecoder};
use episode_net::{EpisodeDownloader, HttpTransferClient, NetClient, NetConfig};
use episode_platform::{FilesystemOperations, LocalFilesystem};
use std::sync::Arc;

/// Every component a command may need, built once per invocation
pub struct AppContext {
    pub fs: Arc<dyn FilesystemOperations>,
    pub downloader: EpisodeDownloader,
    pub installer: EpisodeInstaller,
    pub validator: ContentValidator,
    pub verifier: IntegrityVerifier,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self, CliError> {
        let layout = config.layout()?;
        let fs: Arc<dyn FilesystemOperations> = Arc::new(LocalFilesystem::new());

        let client = NetClient::new(NetConfig::from(&config.network))?;
        let transfer = Arc::new(HttpTransferClient::new(client));
        let downloader = EpisodeDownloader::new(transfer, Arc::clone(&fs), layout.clone());

        let validator = ContentValidator::from_config(&config.install);
        let installer = EpisodeInstaller::new(
            Arc::clone(&fs),
            Arc::new(ZipDecoder::new()),
            validator.clone(),
            layout,
        );

        tracing::debug!(
            episodes = %installer.layout().episodes_root().display(),
            temp = %installer.layout().temp_dir().display(),
            hash = %config.install.hash_algorithm,
            "pipeline configured"
        );

        Ok(Self {
            fs,
            downloader,
            installer,
            validator,
            verifier: IntegrityVerifier::new(config.install.hash_algorithm),
        })
    }
}
