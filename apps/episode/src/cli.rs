//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// episode - download, verify and install episode packages
#[derive(Parser)]
#[command(name = "episode")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Download, verify and install versioned episode packages")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding installed episodes
    #[arg(long, global = true, value_name = "DIR")]
    pub support_dir: Option<PathBuf>,

    /// Directory for downloads in progress and completed archives
    #[arg(long, global = true, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

/// Remote archive to download
#[derive(Args, Clone)]
pub struct ResourceArgs {
    /// Episode identifier
    pub id: String,

    /// Version assigned by the origin server
    pub version: u32,

    /// Archive URL
    pub url: String,

    /// Advertised archive size in bytes, if known
    #[arg(long, default_value_t = 0)]
    pub size: u64,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Download an episode archive, resuming a previous partial download
    #[command(alias = "dl")]
    Download {
        #[command(flatten)]
        resource: ResourceArgs,
    },

    /// Install a downloaded archive
    #[command(alias = "i")]
    Install {
        /// Path to the archive
        archive: PathBuf,

        /// Episode identifier
        id: String,

        /// Version to install as
        version: u32,
    },

    /// Download, optionally verify, and install in one step
    Fetch {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Expected hex digest of the archive
        #[arg(long, value_name = "HEX")]
        digest: Option<String>,

        /// Keep the downloaded archive after installing
        #[arg(long)]
        keep_archive: bool,
    },

    /// Check a file against an expected digest
    Verify {
        /// File to hash
        file: PathBuf,

        /// Expected hex digest
        digest: String,
    },

    /// Check an extracted tree for the required members
    Validate {
        /// Root of the extracted tree
        path: PathBuf,
    },

    /// List installed versions of an episode
    #[command(alias = "ls")]
    List {
        /// Episode identifier
        id: String,
    },

    /// Remove an installed version
    #[command(alias = "rm")]
    Remove {
        /// Episode identifier
        id: String,

        /// Installed version
        version: u32,
    },

    /// Delete downloads in progress and archives of an episode
    Cleanup {
        /// Episode identifier
        id: String,
    },
}
