//! Homework sentinel CLI
//!
//! Command-line interface for the review status monitoring and notification service.

use std::path::{Path, PathBuf};

use clap::Parser;
use homework_sentinel::{load_config, Config};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "homework-sentinel")]
#[command(about = "Homework review status monitoring and Telegram notification service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval in seconds (overrides config file)
    #[arg(long)]
    retry_period: Option<u64>,

    /// Also append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn init_logging(level: Level, log_file: Option<&Path>) -> std::io::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging(args.log_level, args.log_file.as_deref())?;

    tracing::debug!(
        "Parsed command line arguments: config={:?}, retry_period={:?}, log_file={:?}, log_level={:?}",
        args.config,
        args.retry_period,
        args.log_file,
        args.log_level
    );

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
        Err(e) => tracing::debug!("No .env file loaded: {}", e),
    }

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(retry_period) = args.retry_period {
        config.retry_period_seconds = retry_period;
    }
    config.validate()?;

    let credentials = match config.resolve_secrets() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!("Critical startup error: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!("Starting homework sentinel");
    tracing::debug!(
        "Endpoint: {}, retry period: {}s, verdicts: {}",
        config.endpoint,
        config.retry_period_seconds,
        config.verdicts.len()
    );

    homework_sentinel::run(config, credentials).await?;

    Ok(())
}
