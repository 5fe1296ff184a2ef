use super::handlers;
use super::state::AppState;
use crate::ws;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Single-shot transcription
        .route("/transcribe", post(handlers::transcribe_upload))
        // Live transcription stream
        .route("/ws/transcribe", get(ws::ws_transcribe))
        // Middleware: request logging + browser clients
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
