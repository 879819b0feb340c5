//! Extraction engine boundary
//!
//! URL validation, metadata retrieval, and the extraction/transcode work
//! are delegated to an external engine consumed through this trait, so the
//! orchestrator can be exercised against a scripted implementation and the
//! production binary stays swappable.

pub mod ytdlp;

pub use ytdlp::YtDlpEngine;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ytaudio_common::Result;

/// Video metadata returned by the probe (also the `/info` payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Stable video identifier
    pub id: String,
    /// Human title, used for title-based naming
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpage_url: Option<String>,
}

/// Heterogeneous progress events reported while the engine works.
///
/// Events carry no session identifier; the orchestrator binds one at the
/// callback-creation boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Transfer progress; speed and eta are display strings forwarded
    /// from the engine's own reporting
    Downloading {
        percent: f64,
        speed: String,
        eta: String,
    },
    /// Download complete, transcode starting
    Finished,
}

/// One-way progress channel from the engine into the orchestrator
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// External media-extraction collaborator
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Validate a URL, returning the video identifier it names.
    /// Pure parsing; no network access.
    fn validate_url(&self, url: &str) -> Result<String>;

    /// Retrieve metadata for the video
    async fn video_info(&self, url: &str) -> Result<VideoInfo>;

    /// Extract the audio track to `output_dir/filename_base.mp3`, invoking
    /// `on_progress` zero or more times along the way and returning the
    /// produced path
    async fn download_audio(
        &self,
        url: &str,
        output_dir: &Path,
        filename_base: &str,
        on_progress: ProgressCallback,
    ) -> Result<PathBuf>;
}
