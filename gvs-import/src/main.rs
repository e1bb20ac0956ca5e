//! gvs-import - Graduate Import Microservice
//!
//! Parses uploaded graduate spreadsheets, validates every record for the
//! preview grid, and forwards confirmed batches to the external Backend
//! Verification Service for signing and persistence.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gvs_import::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "gvs-import", version, about = "Graduate Verification System import service")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "GVS_IMPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = gvs_common::config::load_config(cli.config.as_deref())?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let port = cli.port.unwrap_or(config.listen_port);

    info!("Starting gvs-import (Graduate Import) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Backend verification service: {}", config.backend_url);
    info!("Column convention: {:?}", config.column_convention);

    let state = AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
