use super::messages::ServerMessage;
use super::pipeline;
use super::session::ConnectionSession;
use crate::http::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;
use tracing::{debug, info, warn};

/// Process-wide map of live connections to their outbound channels.
/// Each entry is written only by its owning connection's handlers.
pub type ConnectionRegistry = Arc<RwLock<HashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>>>;

/// GET /ws/transcribe — upgrade to the live transcription protocol.
pub async fn ws_transcribe(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one WebSocket connection for its whole lifetime.
///
/// A writer task drains the outbound channel into the socket; the read
/// loop below dispatches control messages synchronously and spawns a task
/// per binary frame. A slow upstream call therefore stalls only its own
/// chunk, and results for concurrent frames may interleave in completion
/// order.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMessage>();

    state
        .connections
        .write()
        .await
        .insert(connection_id, out_tx.clone());

    info!("Connection {} established", connection_id);

    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let payload = match serde_json::to_string(&msg) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let _ = out_tx.send(ServerMessage::Connected {
        connection_id: connection_id.to_string(),
    });

    let mut session = ConnectionSession::new();

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(reply) = session.handle_text(&text) {
                    let _ = out_tx.send(reply);
                }
            }
            Ok(Message::Binary(data)) => {
                let mime_type = session.resolve_mime_type(&state.config.audio.default_mime_type);
                if let Some(meta) = session.take_pending_meta() {
                    debug!("Chunk metadata for next frame: {}", meta);
                }

                // One task per frame; frames are independent by design.
                tokio::spawn(pipeline::process_chunk(
                    state.transcriber.clone(),
                    data,
                    mime_type,
                    state.config.audio.max_payload_bytes,
                    out_tx.clone(),
                ));
            }
            // axum replies to pings itself; pongs need no action.
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!("Connection {} socket error: {}", connection_id, e);
                break;
            }
        }
    }

    session.clear();
    state.connections.write().await.remove(&connection_id);
    drop(out_tx);

    // In-flight chunk tasks still hold senders; the writer exits once the
    // last of them drops or the socket refuses a send.
    let _ = writer.await;

    info!("Connection {} closed", connection_id);
}
