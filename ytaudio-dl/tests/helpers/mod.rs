//! Shared helpers for ytaudio-dl integration tests

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use serde_json::Value;
use tempfile::TempDir;
use ytaudio_common::{Error, Result};
use ytaudio_dl::config::ServerConfig;
use ytaudio_dl::engine::{ExtractionEngine, ProgressCallback, ProgressEvent, VideoInfo};
use ytaudio_dl::{build_router, AppState};

/// Where a scripted engine should fail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailAt {
    Validate,
    Info,
    Download,
    NoArtifact,
}

/// Scripted extraction engine standing in for yt-dlp
pub struct MockEngine {
    pub video_id: String,
    pub title: String,
    pub events: Vec<ProgressEvent>,
    pub fail: Option<FailAt>,
    pub payload: Vec<u8>,
}

impl MockEngine {
    pub fn happy(video_id: &str, title: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: title.to_string(),
            events: vec![
                ProgressEvent::Downloading {
                    percent: 12.5,
                    speed: "1.20MiB/s".to_string(),
                    eta: "00:42".to_string(),
                },
                ProgressEvent::Downloading {
                    percent: 87.5,
                    speed: "1.31MiB/s".to_string(),
                    eta: "00:05".to_string(),
                },
                ProgressEvent::Finished,
            ],
            fail: None,
            payload: b"ID3 fake mp3 payload for streaming tests".to_vec(),
        }
    }

    pub fn failing_at(fail: FailAt) -> Self {
        let mut engine = Self::happy("dQw4w9WgXcQ", "Test Video");
        engine.fail = Some(fail);
        engine
    }
}

#[async_trait]
impl ExtractionEngine for MockEngine {
    fn validate_url(&self, url: &str) -> Result<String> {
        if self.fail == Some(FailAt::Validate) {
            return Err(Error::InvalidInput(format!(
                "Not a recognized YouTube URL: {url}"
            )));
        }
        Ok(self.video_id.clone())
    }

    async fn video_info(&self, _url: &str) -> Result<VideoInfo> {
        if self.fail == Some(FailAt::Info) {
            return Err(Error::Unavailable("Video unavailable".to_string()));
        }
        Ok(VideoInfo {
            id: self.video_id.clone(),
            title: self.title.clone(),
            uploader: Some("Test Uploader".to_string()),
            duration: Some(212.0),
            thumbnail: None,
            webpage_url: None,
        })
    }

    async fn download_audio(
        &self,
        _url: &str,
        output_dir: &Path,
        filename_base: &str,
        on_progress: ProgressCallback,
    ) -> Result<PathBuf> {
        if self.fail == Some(FailAt::Download) {
            return Err(Error::Extraction("Signature extraction failed".to_string()));
        }
        for event in &self.events {
            on_progress(event.clone());
        }
        let path = output_dir.join(format!("{filename_base}.mp3"));
        if self.fail != Some(FailAt::NoArtifact) {
            std::fs::write(&path, &self.payload)?;
        }
        Ok(path)
    }
}

/// App under test; holds the temp save directory open for the test's
/// lifetime
pub struct TestApp {
    pub app: axum::Router,
    pub state: AppState,
    pub save_dir: TempDir,
}

/// Build a router around a scripted engine and a fresh save directory
pub fn setup_app(engine: MockEngine) -> TestApp {
    let save_dir = TempDir::new().expect("tempdir");
    let config = ServerConfig {
        save_dir: save_dir.path().to_path_buf(),
        static_dir: save_dir.path().join("static"),
    };
    let state = AppState::new(config, Arc::new(engine));
    let app = build_router(state.clone());
    TestApp {
        app,
        state,
        save_dir,
    }
}

/// Build a request with an empty body
pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Names of regular files currently inside the save directory
pub fn saved_files(app: &TestApp) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(app.save_dir.path())
        .expect("Should list save dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
