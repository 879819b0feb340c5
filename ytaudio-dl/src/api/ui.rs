//! Root UI route
//!
//! Serves `index.html` from the configured static directory when present;
//! otherwise answers with a JSON usage notice.

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde_json::json;

use crate::AppState;

/// GET /
pub async fn serve_index(State(state): State<AppState>) -> impl IntoResponse {
    let index = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(contents) => Html(contents).into_response(),
        Err(_) => Json(json!({
            "message": "ytaudio audio downloader API is running",
            "usage": "GET /stream?url=YOUR_VIDEO_URL",
            "ui_status": "index.html not found in static folder",
        }))
        .into_response(),
    }
}
