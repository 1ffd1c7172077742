//! episode - download, verify and install versioned episode packages
//!
//! This is the CLI application that wires the download orchestrator, the
//! integrity verifier and the installer together.

mod cli;
mod display;
mod error;
mod setup;

use crate::cli::{Cli, Commands, GlobalArgs, ResourceArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::setup::AppContext;
use clap::Parser;
use episode_config::Config;
use episode_errors::Error;
use episode_events::DownloadPhase;
use episode_types::EpisodeResource;
use futures::StreamExt;
use serde_json::json;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if json_mode {
            println!("{}", json!({ "error": e.to_string() }));
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting episode v{}", env!("CARGO_PKG_VERSION"));

    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(&cli.global.config).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global);

    let ctx = AppContext::new(&config)?;
    let mut renderer = OutputRenderer::new(cli.global.json);

    execute_command(cli.command, &ctx, &mut renderer).await?;

    info!("Command completed successfully");
    Ok(())
}

fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if let Some(dir) = &global.support_dir {
        config.paths.support_dir = Some(dir.clone());
    }
    if let Some(dir) = &global.temp_dir {
        config.paths.temp_dir = Some(dir.clone());
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    ctx: &AppContext,
    renderer: &mut OutputRenderer,
) -> Result<(), CliError> {
    match command {
        Commands::Download { resource } => {
            let archive = download(ctx, resource, renderer).await?;
            renderer.result(
                &archive.display().to_string(),
                &json!({ "archive": archive }),
            );
        }

        Commands::Install {
            archive,
            id,
            version,
        } => {
            let path = ctx.installer.install(&archive, &id, version).await?;
            renderer.result(
                &format!("Installed {id} v{version} at {}", path.display()),
                &json!({ "installed": path, "id": id, "version": version }),
            );
        }

        Commands::Fetch {
            resource,
            digest,
            keep_archive,
        } => {
            let id = resource.id.clone();
            let version = resource.version;
            let archive = download(ctx, resource, renderer).await?;

            if let Some(expected) = digest {
                ctx.verifier.verify(&archive, &expected).await?;
                info!(archive = %archive.display(), "archive digest verified");
            }

            let path = ctx.installer.install(&archive, &id, version).await?;
            if !keep_archive {
                ctx.fs.safe_delete(&archive).await?;
            }
            renderer.result(
                &format!("Installed {id} v{version} at {}", path.display()),
                &json!({ "installed": path, "id": id, "version": version }),
            );
        }

        Commands::Verify { file, digest } => {
            ctx.verifier.verify(&file, &digest).await?;
            renderer.result(
                &format!("{}: OK ({})", file.display(), ctx.verifier.algorithm()),
                &json!({ "file": file, "verified": true }),
            );
        }

        Commands::Validate { path } => {
            let result = ctx.validator.validate_in_background(path.clone()).await?;
            if !result.is_valid {
                return Err(CliError::Invalid(result));
            }
            renderer.result(
                &format!("{}: valid", path.display()),
                &json!({ "path": path, "validation": result }),
            );
        }

        Commands::List { id } => {
            let versions = ctx.installer.installed_version_numbers(&id).await?;
            let lines: Vec<String> = versions
                .iter()
                .map(|v| {
                    format!(
                        "v{v}\t{}",
                        ctx.installer.layout().final_path(&id, *v).display()
                    )
                })
                .collect();
            renderer.lines("versions", &lines, json!(versions));
        }

        Commands::Remove { id, version } => {
            ctx.installer.remove_version(&id, version).await?;
            renderer.result(
                &format!("Removed {id} v{version}"),
                &json!({ "removed": id, "version": version }),
            );
        }

        Commands::Cleanup { id } => {
            let removed = ctx.downloader.cleanup_temp_files(&id).await;
            renderer.result(
                &format!("Removed {removed} temporary file(s) for {id}"),
                &json!({ "id": id, "removed": removed }),
            );
        }
    }

    Ok(())
}

/// Run one download to completion, cancelling it on Ctrl-C
async fn download(
    ctx: &AppContext,
    args: ResourceArgs,
    renderer: &mut OutputRenderer,
) -> Result<PathBuf, CliError> {
    let resource = EpisodeResource::new(args.id, args.version, args.size, args.url);
    let archive = ctx.downloader.completed_archive_path(&resource);
    let id = resource.id.clone();
    let mut stream = ctx.downloader.download(resource);
    let mut interrupted = false;

    loop {
        let item = tokio::select! {
            item = stream.next() => item,
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                info!(resource_id = %id, "interrupt received, cancelling download");
                ctx.downloader.cancel(&id);
                continue;
            }
        };

        match item {
            Some(Ok(progress)) => {
                renderer.progress(&progress);
                match progress.phase {
                    DownloadPhase::Completed => return Ok(archive),
                    DownloadPhase::Failed => return Err(Error::Cancelled.into()),
                    DownloadPhase::Initial | DownloadPhase::Downloading => {}
                }
            }
            Some(Err(e)) => return Err(e.into()),
            None => {
                return Err(Error::internal("download ended without a final record").into())
            }
        }
    }
}

fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "info,episode=debug"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // Logs go to stderr so stdout carries only results
    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}
