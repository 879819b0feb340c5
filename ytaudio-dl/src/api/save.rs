//! Save-mode delivery
//!
//! Runs the extraction into the configured save directory and keeps the
//! artifact there permanently; only the progress entry is cleaned up, by a
//! best-effort task detached from the response.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ytaudio_common::naming;

use crate::error::ApiResult;
use crate::session::NamingPolicy;
use crate::AppState;

/// Query parameters for `/save`
#[derive(Debug, Deserialize)]
pub struct SaveQuery {
    /// The video URL to extract audio from
    pub url: String,
    /// Use hash+timestamp naming instead of the video title
    #[serde(default)]
    pub use_hash: bool,
    /// Session id for progress tracking (server-generated when absent)
    pub session_id: Option<String>,
}

/// Success payload for `/save`
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: String,
    pub message: String,
    pub path: String,
    pub filename: String,
}

/// POST /save
pub async fn save_audio(
    State(state): State<AppState>,
    Query(query): Query<SaveQuery>,
) -> ApiResult<Json<SaveResponse>> {
    let session_id = query.session_id.unwrap_or_else(naming::session_token);

    let policy = if query.use_hash {
        NamingPolicy::Hashed
    } else {
        NamingPolicy::Title
    };

    let artifact = state
        .orchestrator
        .run(&session_id, &query.url, policy, &state.config.save_dir)
        .await?;

    // Post-response analog of a background cleanup task: the saved file is
    // permanent, the progress entry is not.
    let progress = Arc::clone(&state.progress);
    tokio::spawn(async move {
        debug!(session_id = %session_id, "Cleaning up session progress");
        progress.remove(&session_id);
    });

    let path = artifact.path.display().to_string();
    Ok(Json(SaveResponse {
        status: "success".to_string(),
        message: format!("Saved to {path}"),
        path,
        filename: artifact.filename,
    }))
}
