//! ytaudio-dl - audio extraction server
//!
//! Accepts a video URL and produces an extracted MP3, saved into the
//! configured directory or streamed back over HTTP, with pollable
//! per-session progress.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use ytaudio_dl::config::{self, Cli, ServerConfig};
use ytaudio_dl::engine::YtDlpEngine;
use ytaudio_dl::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification immediately after tracing init: instant startup
    // feedback before any filesystem or subprocess work.
    info!(
        "Starting ytaudio audio downloader (ytaudio-dl) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();

    let requested = config::resolve_save_dir(cli.save_dir.as_deref());
    let save_dir = config::prepare_save_dir(&requested)?;

    let config = ServerConfig {
        save_dir,
        static_dir: cli.static_dir.clone(),
    };

    let engine = Arc::new(YtDlpEngine::new(cli.ytdlp_bin.clone()).await?);

    let state = AppState::new(config, engine);
    let app = build_router(state);

    let addr = format!("{}:{}", cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ytaudio-dl listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
