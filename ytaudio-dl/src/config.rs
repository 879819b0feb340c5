//! Configuration resolution for ytaudio-dl
//!
//! The save directory is resolved by priority order:
//! 1. Command-line argument (highest priority)
//! 2. `SAVE_DIRECTORY` environment variable
//! 3. Platform Downloads folder (fallback)
//!
//! If the resolved directory cannot be created (common in containers), the
//! service falls back to a writable location under the system temp dir.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};
use ytaudio_common::{Error, Result};

/// Environment variable consulted when `--save-dir` is absent
pub const SAVE_DIR_ENV: &str = "SAVE_DIRECTORY";

/// Directory created under the system temp dir when the configured save
/// directory cannot be used
const FALLBACK_DIR_NAME: &str = "ytaudio_fallback";

/// ytaudio-dl server command line
#[derive(Debug, Parser)]
#[command(name = "ytaudio-dl", version, about = "Audio extraction server")]
pub struct Cli {
    /// Directory MP3 files are saved to (falls back to SAVE_DIRECTORY,
    /// then the platform Downloads folder)
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Path to the yt-dlp binary (defaults to PATH lookup)
    #[arg(long)]
    pub ytdlp_bin: Option<PathBuf>,

    /// Directory probed for an optional web UI
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Absolute directory save-mode artifacts land in; stream-mode
    /// artifacts are produced here too, then deleted after delivery
    pub save_dir: PathBuf,
    /// Directory probed for `index.html`
    pub static_dir: PathBuf,
}

/// Resolve the save directory following the priority order above.
pub fn resolve_save_dir(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(SAVE_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    default_save_dir()
}

/// Platform Downloads folder, with home-relative and cwd fallbacks
fn default_save_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Ensure the save directory exists, falling back to a writable temp
/// location when it cannot be created.
pub fn prepare_save_dir(requested: &Path) -> Result<PathBuf> {
    match std::fs::create_dir_all(requested) {
        Ok(()) => {
            let resolved = requested
                .canonicalize()
                .unwrap_or_else(|_| requested.to_path_buf());
            info!("Files will be saved to: {}", resolved.display());
            Ok(resolved)
        }
        Err(e) => {
            let fallback = std::env::temp_dir().join(FALLBACK_DIR_NAME);
            warn!(
                "Could not use {}: {}. Falling back to: {}",
                requested.display(),
                e,
                fallback.display()
            );
            std::fs::create_dir_all(&fallback).map_err(|e| {
                Error::Config(format!(
                    "Fallback save directory {} is not writable: {e}",
                    fallback.display()
                ))
            })?;
            Ok(fallback)
        }
    }
}
