//! Live transcription over one bidirectional WebSocket per client.
//!
//! Clients send JSON control frames (audio_start / chunk_meta / audio_end)
//! and binary audio chunks; the server pushes back connection, status,
//! and transcript messages. Each chunk is processed independently and a
//! per-chunk failure never closes the connection.

mod handler;
mod messages;
mod pipeline;
mod session;

pub use handler::{ws_transcribe, ConnectionRegistry};
pub use messages::{ClientMessage, ServerMessage};
pub use pipeline::process_chunk;
pub use session::{ConnectionSession, SessionBuffer};
