//! Download-session orchestration
//!
//! Drives a single extraction through its lifecycle: URL validation,
//! session creation, the metadata probe, output naming (with collision
//! resolution for persistent names), the download itself with progress
//! forwarded into the store, and the postcondition check on the produced
//! artifact. Every failure is recorded as the session's terminal `error`
//! state at this one boundary before it propagates, so a poller can always
//! observe terminal status even after the originating connection is gone.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use ytaudio_common::progress::{Progress, ProgressStore};
use ytaudio_common::{naming, paths, Error, Result};

use crate::engine::{ExtractionEngine, ProgressCallback, ProgressEvent};

/// Message shown while the transcode runs
const CONVERTING_MESSAGE: &str = "Converting to MP3...";

/// How the output filename is derived before path resolution
#[derive(Debug, Clone)]
pub enum NamingPolicy {
    /// Sanitized metadata title plus the audio extension
    Title,
    /// `{video_id}_{timestamp}_{suffix}.mp3`, collision-resistant
    /// independent of title content
    Hashed,
    /// Transient name for streamed artifacts; skips collision resolution
    /// since the file is deleted after delivery
    Ephemeral { base: Option<String> },
}

/// The produced audio file, ready for delivery
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Absolute location on disk
    pub path: PathBuf,
    /// Basename carried into `finished` progress and response headers
    pub filename: String,
}

/// Creates tracked sessions and runs one extraction per call
pub struct SessionOrchestrator {
    engine: Arc<dyn ExtractionEngine>,
    progress: Arc<ProgressStore>,
}

impl SessionOrchestrator {
    pub fn new(engine: Arc<dyn ExtractionEngine>, progress: Arc<ProgressStore>) -> Self {
        Self { engine, progress }
    }

    /// Run one extraction under `session_id`, producing the artifact in
    /// `output_dir`.
    pub async fn run(
        &self,
        session_id: &str,
        url: &str,
        policy: NamingPolicy,
        output_dir: &Path,
    ) -> Result<Artifact> {
        let result = self.drive(session_id, url, policy, output_dir).await;
        if let Err(err) = &result {
            warn!(session_id, error = %err, "Session failed");
            self.progress
                .set(session_id, Progress::error(err.to_string()));
        }
        result
    }

    async fn drive(
        &self,
        session_id: &str,
        url: &str,
        policy: NamingPolicy,
        output_dir: &Path,
    ) -> Result<Artifact> {
        let video_id = self.engine.validate_url(url)?;

        self.progress.set(session_id, Progress::starting());
        debug!(session_id, video_id, "Session started");

        let metadata = self.engine.video_info(url).await?;

        let (resolved, filename_base) = match &policy {
            NamingPolicy::Ephemeral { base } => {
                (None, naming::ephemeral_basename(base.as_deref(), &video_id))
            }
            persistent => {
                let desired = match persistent {
                    NamingPolicy::Title => naming::title_filename(&metadata.title, &video_id),
                    _ => naming::hashed_filename(&video_id),
                };
                let resolved = paths::unique_path(output_dir, &desired);
                // The engine manages extension placement itself, so it gets
                // the resolved basename without the extension.
                let base = resolved
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .ok_or_else(|| {
                        Error::InvalidInput(format!("Unusable output filename: {desired}"))
                    })?
                    .to_string();
                (Some(resolved), base)
            }
        };

        let produced = self
            .engine
            .download_audio(url, output_dir, &filename_base, self.bind_callback(session_id))
            .await?;

        let path = resolved.unwrap_or(produced);
        if !path.exists() {
            return Err(Error::MissingArtifact(
                "File not found after processing".to_string(),
            ));
        }

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&filename_base)
            .to_string();

        self.progress.set(
            session_id,
            Progress::finished(path.display().to_string(), filename.clone()),
        );
        info!(session_id, path = %path.display(), "Session finished");

        Ok(Artifact { path, filename })
    }

    /// Bind a progress callback to `session_id`; the engine itself stays
    /// unaware of sessions.
    fn bind_callback(&self, session_id: &str) -> ProgressCallback {
        let store = Arc::clone(&self.progress);
        let session_id = session_id.to_string();
        Box::new(move |event| match event {
            ProgressEvent::Downloading { percent, speed, eta } => {
                store.set(&session_id, Progress::downloading(percent, speed, eta));
            }
            ProgressEvent::Finished => {
                store.set(&session_id, Progress::processing(CONVERTING_MESSAGE));
            }
        })
    }
}
