use super::messages::{ClientMessage, ServerMessage};
use tracing::{debug, warn};

/// Transient per-connection state for an in-progress audio stream.
///
/// Created by audio_start, discarded by audio_end or disconnect. Never
/// persisted. At most one buffer exists per connection; a new audio_start
/// silently replaces any prior one.
#[derive(Debug, Clone)]
pub struct SessionBuffer {
    /// Container/codec the client declared for its binary frames.
    pub mime_type: String,

    /// Advisory metadata for the next binary frame, if the client sent
    /// a chunk_meta message. Consumed by the next frame.
    pub pending_meta: Option<serde_json::Value>,
}

impl SessionBuffer {
    pub fn new(mime_type: String) -> Self {
        Self {
            mime_type,
            pending_meta: None,
        }
    }
}

/// Per-connection control state: `Idle → Buffering → Idle`.
#[derive(Debug, Default)]
pub struct ConnectionSession {
    buffer: Option<SessionBuffer>,
}

impl ConnectionSession {
    pub fn new() -> Self {
        Self { buffer: None }
    }

    pub fn is_buffering(&self) -> bool {
        self.buffer.is_some()
    }

    /// Mime type for the next binary frame: the declared one if a stream
    /// was started, otherwise the configured default.
    pub fn resolve_mime_type(&self, default_mime_type: &str) -> String {
        self.buffer
            .as_ref()
            .map(|b| b.mime_type.clone())
            .unwrap_or_else(|| default_mime_type.to_string())
    }

    /// Take the advisory metadata attached to the next frame, if any.
    pub fn take_pending_meta(&mut self) -> Option<serde_json::Value> {
        self.buffer.as_mut().and_then(|b| b.pending_meta.take())
    }

    /// Apply one control message and produce the reply to send, if any.
    pub fn handle_control(&mut self, msg: ClientMessage) -> Option<ServerMessage> {
        match msg {
            ClientMessage::AudioStart { mime_type } => {
                if self.buffer.is_some() {
                    debug!("audio_start while buffering, replacing session buffer");
                }
                self.buffer = Some(SessionBuffer::new(mime_type));
                Some(ServerMessage::AudioStartAck)
            }
            ClientMessage::ChunkMeta { info } => {
                match &mut self.buffer {
                    Some(buffer) => buffer.pending_meta = Some(info),
                    // Advisory only; meaningless without a stream.
                    None => warn!("chunk_meta received outside an audio stream, ignoring"),
                }
                None
            }
            ClientMessage::AudioEnd => {
                self.buffer = None;
                None
            }
        }
    }

    /// Parse and apply a raw text frame. Malformed or unrecognized
    /// messages yield an error reply and leave the state unchanged.
    pub fn handle_text(&mut self, raw: &str) -> Option<ServerMessage> {
        match serde_json::from_str::<ClientMessage>(raw) {
            Ok(msg) => self.handle_control(msg),
            Err(e) => {
                warn!("Malformed control message: {}", e);
                Some(ServerMessage::error(format!(
                    "unrecognized control message: {}",
                    e
                )))
            }
        }
    }

    /// Drop any buffered state (disconnect path).
    pub fn clear(&mut self) {
        self.buffer = None;
    }
}
