//! Progress polling endpoint

use axum::extract::{Path, State};
use axum::Json;
use ytaudio_common::progress::Progress;

use crate::AppState;

/// GET /progress/:session_id
///
/// Absence is not exceptional: sessions may be polled before creation or
/// after cleanup, so unknown identifiers report the `not_started` sentinel
/// and this endpoint never errors.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Progress> {
    Json(state.progress.get(&session_id))
}
