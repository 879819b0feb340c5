//! ytaudio-dl library - audio download service
//!
//! Exposes the application state and router so integration tests can drive
//! the full HTTP surface with a substituted extraction engine.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use ytaudio_common::progress::ProgressStore;

use crate::config::ServerConfig;
use crate::engine::ExtractionEngine;
use crate::session::SessionOrchestrator;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service configuration
    pub config: Arc<ServerConfig>,
    /// Per-session progress table, polled via `/progress/{id}`
    pub progress: Arc<ProgressStore>,
    /// External media-extraction collaborator
    pub engine: Arc<dyn ExtractionEngine>,
    /// Drives one extraction through its lifecycle per request
    pub orchestrator: Arc<SessionOrchestrator>,
}

impl AppState {
    /// Create application state around an extraction engine
    pub fn new(config: ServerConfig, engine: Arc<dyn ExtractionEngine>) -> Self {
        let progress = Arc::new(ProgressStore::new());
        let orchestrator = Arc::new(SessionOrchestrator::new(
            Arc::clone(&engine),
            Arc::clone(&progress),
        ));
        Self {
            config: Arc::new(config),
            progress,
            engine,
            orchestrator,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/info", get(api::video_info))
        .route("/progress/:session_id", get(api::get_progress))
        .route("/save", post(api::save_audio))
        .route("/stream", get(api::stream_audio))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
