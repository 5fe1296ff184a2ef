pub mod config;
pub mod http;
pub mod transcribe;
pub mod ws;

pub use config::Config;
pub use http::{create_router, AppState};
pub use transcribe::{
    DemoTranscriber, Lang, TranscribeError, Transcriber, Transcription, WhisperGateway,
    DEMO_PHRASES,
};
pub use ws::{ClientMessage, ConnectionSession, ServerMessage};
