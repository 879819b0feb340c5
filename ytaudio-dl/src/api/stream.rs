//! Stream-mode delivery
//!
//! Runs the extraction into a transient file, serves it back as a chunked
//! attachment with the exact byte length, and deletes the artifact once the
//! body has been delivered or the client has gone away. The progress entry
//! is left in place for late pollers.

use std::io;
use std::path::PathBuf;

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};
use ytaudio_common::naming;

use crate::error::{ApiError, ApiResult};
use crate::session::NamingPolicy;
use crate::AppState;

/// Chunk size for the response body (1 MiB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Query parameters for `/stream`
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// The video URL to extract audio from
    pub url: String,
    /// Optional custom filename (extension managed by the engine)
    pub filename: Option<String>,
    /// Session id for progress tracking (server-generated when absent)
    pub session_id: Option<String>,
}

/// Deletes the artifact when dropped, whether the body completed or the
/// client disconnected mid-stream.
struct RemoveOnDrop {
    path: PathBuf,
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed streamed artifact"),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove streamed artifact")
            }
        }
    }
}

/// GET /stream
pub async fn stream_audio(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> ApiResult<Response> {
    let session_id = query.session_id.unwrap_or_else(naming::session_token);

    let policy = NamingPolicy::Ephemeral {
        base: query.filename,
    };

    let artifact = state
        .orchestrator
        .run(&session_id, &query.url, policy, &state.config.save_dir)
        .await?;

    // From here on the delivery layer owns the artifact; the guard travels
    // into the body stream so the file outlives exactly the response.
    let guard = RemoveOnDrop {
        path: artifact.path.clone(),
    };

    let mut file = tokio::fs::File::open(&artifact.path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open artifact: {e}")))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to stat artifact: {e}")))?
        .len();

    let body_stream = async_stream::stream! {
        let _guard = guard;
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            match file.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => yield Ok::<_, io::Error>(Bytes::copy_from_slice(&buf[..n])),
                Err(e) => {
                    warn!(error = %e, "Streaming error");
                    yield Err(e);
                    break;
                }
            }
        }
    };

    let headers = [
        (header::CONTENT_TYPE, "audio/mpeg".to_string()),
        (header::CONTENT_LENGTH, length.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.filename),
        ),
        (header::CACHE_CONTROL, "no-cache".to_string()),
    ];

    Ok((headers, Body::from_stream(body_stream)).into_response())
}
