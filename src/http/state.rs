use crate::config::Config;
use crate::transcribe::Transcriber;
use crate::ws::ConnectionRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP and WebSocket handlers
#[derive(Clone)]
pub struct AppState {
    /// Live WebSocket connections (connection id → outbound channel)
    pub connections: ConnectionRegistry,

    /// Transcription backend: live gateway or demo fallback,
    /// selected once at startup
    pub transcriber: Arc<dyn Transcriber>,

    /// Service configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            transcriber,
            config: Arc::new(config),
        }
    }
}
