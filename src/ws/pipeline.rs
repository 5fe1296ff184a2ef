use super::messages::ServerMessage;
use crate::transcribe::{
    extension_for_mime, write_transient_chunk, TranscribeError, Transcriber, Transcription,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Send a message to the connection, dropping it silently if the client
/// has already disconnected (the outbound channel is closed).
fn send_or_drop(outbound: &mpsc::UnboundedSender<ServerMessage>, msg: ServerMessage) {
    if outbound.send(msg).is_err() {
        debug!("Connection closed, dropping outbound message");
    }
}

/// Process one binary audio frame end to end.
///
/// Emits a `processing` status followed by exactly one of `transcript`,
/// `silence`, or `error`. Failures are reported and swallowed here; a bad
/// chunk never terminates the connection. Frames are independent: this
/// function holds no state across calls, and concurrent frames for the
/// same connection may complete in either order.
pub async fn process_chunk(
    transcriber: Arc<dyn Transcriber>,
    frame: Vec<u8>,
    mime_type: String,
    max_payload_bytes: usize,
    outbound: mpsc::UnboundedSender<ServerMessage>,
) {
    send_or_drop(&outbound, ServerMessage::Processing);

    let reply = match transcribe_frame(transcriber, frame, &mime_type, max_payload_bytes).await {
        Ok(t) if t.text.is_empty() => ServerMessage::Silence,
        Ok(t) => ServerMessage::Transcript {
            text: t.text,
            lang: t.lang,
            time: Utc::now(),
        },
        Err(e) => {
            warn!("Chunk processing failed: {}", e);
            ServerMessage::error(e.to_string())
        }
    };

    send_or_drop(&outbound, reply);
}

/// Run one frame through the transcriber.
///
/// In live mode the frame is first persisted to a uniquely-named temp
/// file; the RAII guard removes it on every exit path, success or
/// failure. Demo mode skips transient storage entirely.
async fn transcribe_frame(
    transcriber: Arc<dyn Transcriber>,
    frame: Vec<u8>,
    mime_type: &str,
    max_payload_bytes: usize,
) -> Result<Transcription, TranscribeError> {
    if frame.len() > max_payload_bytes {
        return Err(TranscribeError::PayloadTooLarge {
            size: frame.len(),
            max: max_payload_bytes,
        });
    }

    if !transcriber.is_live() {
        return transcriber.transcribe(&frame, mime_type).await;
    }

    let extension = extension_for_mime(mime_type)
        .ok_or_else(|| TranscribeError::UnsupportedFormat(mime_type.to_string()))?;

    let chunk_file = write_transient_chunk(&frame, extension)?;
    debug!(
        "Persisted {} byte chunk to {}",
        frame.len(),
        chunk_file.path().display()
    );

    let audio = tokio::fs::read(chunk_file.path())
        .await
        .map_err(TranscribeError::TransientStorage)?;

    transcriber.transcribe(&audio, mime_type).await
}
