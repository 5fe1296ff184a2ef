use super::language::{self, Lang};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

/// One transcribed audio chunk.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub lang: Lang,
    pub duration_secs: f64,
}

/// Per-chunk failure taxonomy. None of these are fatal to a connection;
/// the pipeline converts each into a single error status message.
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("audio payload is {size} bytes, exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("transient chunk storage failed: {0}")]
    TransientStorage(#[source] std::io::Error),

    #[error("transcription failed: {0}")]
    Upstream(#[source] anyhow::Error),
}

/// The speech-to-text seam. `WhisperGateway` talks to the real upstream
/// capability; `DemoTranscriber` substitutes canned output when no
/// credentials are configured. The chunk pipeline is identical either way.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<Transcription, TranscribeError>;

    /// Whether a live upstream capability backs this transcriber.
    fn is_live(&self) -> bool;
}

/// Container extensions the upstream capability can decode, keyed by the
/// subtype of the declared mime type (e.g. "audio/webm" → "webm").
const ACCEPTED_FORMATS: &[(&str, &str)] = &[
    ("webm", "webm"),
    ("wav", "wav"),
    ("x-wav", "wav"),
    ("mp3", "mp3"),
    ("mpeg", "mp3"),
    ("mpga", "mp3"),
    ("mp4", "mp4"),
    ("m4a", "m4a"),
    ("x-m4a", "m4a"),
    ("ogg", "ogg"),
    ("oga", "ogg"),
    ("flac", "flac"),
];

/// Map a declared mime type to the file extension sent upstream.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let subtype = mime_type
        .split('/')
        .nth(1)
        .unwrap_or(mime_type)
        .split(';')
        .next()
        .unwrap_or("")
        .trim();

    ACCEPTED_FORMATS
        .iter()
        .find(|(mime, _)| *mime == subtype)
        .map(|(_, ext)| *ext)
}

/// Gateway to an OpenAI-compatible `audio/transcriptions` endpoint.
///
/// One multipart request per chunk, no retries, no state between calls.
pub struct WhisperGateway {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_payload_bytes: usize,
}

/// `verbose_json` response shape from the upstream capability.
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    language: Option<String>,
    #[serde(default)]
    duration: f64,
}

impl WhisperGateway {
    pub fn new(api_url: String, api_key: String, model: String, max_payload_bytes: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
            max_payload_bytes,
        }
    }

    /// Validate a payload against the upstream size and format limits.
    /// Returns the container extension to tag the upload with.
    fn validate(&self, audio: &[u8], mime_type: &str) -> Result<&'static str, TranscribeError> {
        if audio.len() > self.max_payload_bytes {
            return Err(TranscribeError::PayloadTooLarge {
                size: audio.len(),
                max: self.max_payload_bytes,
            });
        }

        extension_for_mime(mime_type)
            .ok_or_else(|| TranscribeError::UnsupportedFormat(mime_type.to_string()))
    }

    async fn call_upstream(&self, audio: Vec<u8>, extension: &str) -> Result<WhisperResponse> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(format!("chunk.{}", extension))
            .mime_str(&format!("audio/{}", extension))
            .context("Failed to build multipart audio part")?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach transcription endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Transcription endpoint returned {}: {}", status, body);
        }

        response
            .json::<WhisperResponse>()
            .await
            .context("Failed to decode transcription response")
    }
}

#[async_trait]
impl Transcriber for WhisperGateway {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<Transcription, TranscribeError> {
        let extension = self.validate(audio, mime_type)?;

        debug!(
            "Sending {} byte {} chunk to transcription endpoint",
            audio.len(),
            extension
        );

        let response = self
            .call_upstream(audio.to_vec(), extension)
            .await
            .map_err(TranscribeError::Upstream)?;

        let text = response.text.trim().to_string();
        let lang = language::normalize(&text, response.language.as_deref());

        info!(
            "Transcribed {:.1}s chunk as {} ({} chars)",
            response.duration,
            lang.code(),
            text.len()
        );

        Ok(Transcription {
            text,
            lang,
            duration_secs: response.duration,
        })
    }

    fn is_live(&self) -> bool {
        true
    }
}

/// Persist one chunk to a uniquely-named temp file so it can be handed to
/// tooling that needs a path. The file is removed when the guard drops,
/// on every exit path.
pub fn write_transient_chunk(
    audio: &[u8],
    extension: &str,
) -> Result<tempfile::NamedTempFile, TranscribeError> {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("meetscribe-chunk-")
        .suffix(&format!(".{}", extension))
        .tempfile()
        .map_err(TranscribeError::TransientStorage)?;

    file.write_all(audio)
        .map_err(TranscribeError::TransientStorage)?;
    file.flush().map_err(TranscribeError::TransientStorage)?;

    Ok(file)
}
