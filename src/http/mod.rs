//! HTTP API surface
//!
//! - POST /transcribe - single-shot multipart audio transcription
//! - GET /health - health check (reports live vs demo backend)
//! - GET /ws/transcribe - WebSocket upgrade for live streaming
//!
//! Session CRUD, search, and auth live in an external collaborator and
//! are not served here.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
