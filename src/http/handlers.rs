use super::state::AppState;
use crate::transcribe::{Lang, TranscribeError};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
    pub lang: Lang,
    pub duration: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(rename = "whisperConfigured")]
    pub whisper_configured: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /transcribe
/// Single-shot transcription of one uploaded audio file
pub async fn transcribe_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    // Find the audio part
    let mut audio: Option<(Vec<u8>, String)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed multipart body: {}", e),
                );
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name != "audio" && name != "file" {
            continue;
        }

        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| state.config.audio.default_mime_type.clone());

        match field.bytes().await {
            Ok(bytes) => {
                audio = Some((bytes.to_vec(), mime_type));
                break;
            }
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read audio field: {}", e),
                );
            }
        }
    }

    let (audio, mime_type) = match audio {
        Some(found) => found,
        None => {
            return error_response(StatusCode::BAD_REQUEST, "Missing audio field in upload");
        }
    };

    info!(
        "Single-shot transcription request: {} bytes ({})",
        audio.len(),
        mime_type
    );

    match state.transcriber.transcribe(&audio, &mime_type).await {
        Ok(result) => (
            StatusCode::OK,
            Json(TranscribeResponse {
                text: result.text,
                lang: result.lang,
                duration: result.duration_secs,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Transcription failed: {}", e);
            let status = match &e {
                TranscribeError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                TranscribeError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                TranscribeError::TransientStorage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                TranscribeError::Upstream(_) => StatusCode::BAD_GATEWAY,
            };
            error_response(status, e.to_string())
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            whisper_configured: state.transcriber.is_live(),
            timestamp: Utc::now(),
        }),
    )
}
