use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub whisper: WhisperConfig,
    pub audio: AudioLimits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Settings for the external speech-to-text capability.
///
/// When `api_key` is absent the service runs in demo mode and serves
/// canned round-robin transcripts instead of calling upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct WhisperConfig {
    pub api_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioLimits {
    /// Largest audio payload the upstream capability accepts, in bytes.
    pub max_payload_bytes: usize,

    /// Mime type assumed for binary frames that arrive before any
    /// audio_start control message declared one.
    pub default_mime_type: String,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/audio/transcriptions".to_string(),
            model: "whisper-1".to_string(),
            api_key: None,
        }
    }
}

impl Default for AudioLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: 25 * 1024 * 1024, // upstream hard limit
            default_mime_type: "audio/webm".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("MEETSCRIBE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
