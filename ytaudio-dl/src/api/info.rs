//! Video metadata endpoint

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::engine::VideoInfo;
use crate::error::ApiResult;
use crate::AppState;

/// Query parameters for `/info`
#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    /// The video URL to probe
    pub url: String,
}

/// GET /info
///
/// Returns metadata for a video. Invalid URLs map to a client error;
/// probe failures surface as upstream errors.
pub async fn video_info(
    State(state): State<AppState>,
    Query(query): Query<InfoQuery>,
) -> ApiResult<Json<VideoInfo>> {
    state.engine.validate_url(&query.url)?;
    let info = state.engine.video_info(&query.url).await?;
    Ok(Json(info))
}
