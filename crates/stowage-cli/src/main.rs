//! Stowage: uploads finished session artifacts to object storage.
//!
//! Configure with `--s3-*` flags or the matching environment variables
//! (S3_ENDPOINT, S3_BUCKET_NAME, ...). Without an endpoint uploads are skipped.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stowage_cli::{init_tracing, upload_all, SessionArgs, UploadStatus, UploaderArgs};
use stowage_core::UploaderConfig;
use stowage_storage::{create_uploader, resolve_key, unrecognized_tokens};

#[derive(Parser)]
#[command(name = "stowage", about = "Upload session artifacts to object storage")]
struct Cli {
    #[command(flatten)]
    uploader: UploaderArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload artifacts produced by one session
    Upload {
        /// Artifact files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Print the object key an artifact would be stored under
    Key {
        /// Artifact file
        file: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = UploaderConfig::load_env()
        .and_then(|env_config| cli.uploader.apply(env_config))
        .context("Invalid uploader configuration")?;

    match cli.command {
        Commands::Upload { files, session } => {
            let uploader = match create_uploader(&config).await {
                Ok(uploader) => uploader,
                Err(e) => {
                    tracing::error!(
                        endpoint = config.endpoint.as_deref().unwrap_or_default(),
                        region = config.region.as_deref().unwrap_or_default(),
                        bucket = config.bucket_name.as_deref().unwrap_or_default(),
                        error = %e,
                        "Failed to initialize uploader"
                    );
                    std::process::exit(1);
                }
            };

            let reports = upload_all(uploader, session.requests(&files)).await;
            print_json(&reports)?;

            let failed = reports
                .iter()
                .filter(|r| r.status == UploadStatus::Failed)
                .count();
            if failed > 0 {
                anyhow::bail!("{} of {} uploads failed", failed, reports.len());
            }
        }
        Commands::Key { file, session } => {
            for token in unrecognized_tokens(&config.key_pattern) {
                tracing::warn!(token = %token, "Unrecognized placeholder in key pattern");
            }
            for request in session.requests(&[file]) {
                println!("{}", resolve_key(&config.key_pattern, &request));
            }
        }
    }

    Ok(())
}
