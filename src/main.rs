// Main entry point for pdfstamp-server.
// Parses configuration, prepares the PDF pipeline and scratch directory,
// then serves the HTTP API until a shutdown signal arrives.

mod config;
mod pdf;
mod shutdown_signal;
mod storage;
mod web;

use clap::Parser;
use config::AppConfig;
use pdf::{LopdfCompressor, LopdfWatermarker, PdfPipeline};
use shutdown_signal::shutdown_signal;
use std::sync::Arc;
use storage::ScratchStore;
use web::{AppState, create_app, create_listener};

#[tokio::main]
async fn main() {
    // Parse command line args and environment variables
    let config = AppConfig::parse();

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_max_level(config.mode.log_level())
        .with_target(true) // Include module path in logs
        .with_file(true) // Include source file name
        .with_line_number(true) // Include line numbers
        .init();

    tracing::info!("Starting pdfstamp-server in {:?} mode...", config.mode);

    let watermark = config.watermark_config().unwrap_or_else(|err| {
        tracing::error!("FATAL: Invalid watermark configuration: {}", err);
        eprintln!("FATAL: Invalid watermark configuration: {}. Exiting.", err);
        std::process::exit(1);
    });
    let watermarker = LopdfWatermarker::new(watermark);
    let settings = watermarker.config();
    tracing::info!(
        "Watermark: text={:?}, font_size={}, opacity={}, rotation={}, color={}",
        settings.text,
        settings.font_size,
        settings.opacity,
        settings.rotation_degrees,
        settings.color
    );

    // --- Scratch directory for one-shot downloads ---
    let scratch = ScratchStore::new(&config.scratch_dir, config.delete_delay());
    if let Err(e) = scratch.ensure_root().await {
        tracing::error!(
            "FATAL: Failed to create scratch directory {}: {}",
            scratch.root().display(),
            e
        );
        eprintln!("FATAL: Could not prepare scratch directory. Error: {}. Exiting.", e);
        std::process::exit(1);
    }
    tracing::info!(
        "Scratch directory set to: {} (delete delay {:?})",
        scratch.root().display(),
        scratch.delete_delay()
    );
    tracing::info!("Serving static files from: {}", config.public_dir.display());

    let pipeline = PdfPipeline::new(
        Arc::new(LopdfCompressor::new()),
        Arc::new(watermarker),
    );
    let state = AppState {
        pipeline: Arc::new(pipeline),
        scratch,
        run_mode: config.mode,
    };

    let app = create_app(state, &config.public_dir);
    tracing::info!("Axum router configured.");

    // --- Start HTTP Server ---
    let listener = match create_listener(&config.host, config.port).await {
        Ok((addr, l)) => {
            tracing::info!("Server successfully bound. Listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("FATAL: Failed to bind server: {}", e);
            eprintln!("FATAL: Could not bind server. Error: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    // Run the server.
    if let Err(e) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server run error: {}", e);
        eprintln!("ERROR: Server shut down unexpectedly. Error: {}", e);
    }

    tracing::info!("pdfstamp-server has shut down.");
}
