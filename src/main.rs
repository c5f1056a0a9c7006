// Voxgate - Normalizing gateway for the voice-call backend
//
// This tool sits between the dashboard and the voice-call backend,
// smoothing over the backend's inconsistent payload shapes so the
// dashboard only ever sees one schema.
//
// Architecture:
// - Gateway server (axum): View routes plus a transparent forwarder
// - Upstream client (reqwest): Talks to the backend over a shared pool
// - Normalize: Maps the backend's many field spellings to stable records

mod cli;
mod config;
mod normalize;
mod proxy;
mod upstream;

use anyhow::Result;
use config::{Config, LogRotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --edit, --update)
    // If a command was handled, exit early
    if cli::handle_cli() {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env();

    // Initialize tracing/logging
    // File logging: optionally write to rotating log files (in addition to stdout)
    //
    // Precedence: RUST_LOG env var > config file > default "info"
    let default_filter = format!("voxgate={},tower_http=debug,axum=debug", config.logging.level);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // Set up file logging if enabled (non-blocking writer with rotation)
    // The guard must be kept alive for the duration of the program to ensure logs flush
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard> =
        if config.logging.file_enabled {
            // Create log directory if it doesn't exist
            if let Err(e) = std::fs::create_dir_all(&config.logging.file_dir) {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                // Fall back to non-file logging
                tracing_subscriber::registry()
                    .with(filter)
                    .with(tracing_subscriber::fmt::layer())
                    .init();
                None
            } else {
                // Create rolling file appender based on configured rotation
                let file_appender = match config.logging.file_rotation {
                    LogRotation::Hourly => tracing_appender::rolling::hourly(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Daily => tracing_appender::rolling::daily(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Never => tracing_appender::rolling::never(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                };

                // Wrap in non-blocking writer (writes happen in background thread)
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // File layer uses JSON format for structured log parsing
                tracing_subscriber::registry()
                    .with(filter)
                    .with(tracing_subscriber::fmt::layer())
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(non_blocking)
                            .with_ansi(false),
                    )
                    .init();

                Some(guard)
            }
        } else {
            // No file logging - initialize without file layer
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();

            None
        };

    // Create shutdown channel for graceful gateway shutdown
    // This is a oneshot channel - it can only send one signal
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    // Translate Ctrl+C into the shutdown signal
    // If the send fails, the gateway has already shut down (which is fine)
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutting down...");
        let _ = shutdown_tx.send(());
    });

    // Run the gateway in the main task so bind errors surface immediately
    proxy::start_gateway(config, shutdown_rx).await?;

    Ok(())
}
