use crate::transcribe::Lang;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Control messages a client sends as text frames. Audio itself arrives
/// as binary frames and never passes through this enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Begin an audio stream; declares the container/codec of the binary
    /// frames that follow.
    #[serde(rename = "audio_start")]
    AudioStart {
        #[serde(rename = "mimeType")]
        mime_type: String,
    },

    /// Advisory metadata for the next binary frame.
    #[serde(rename = "chunk_meta")]
    ChunkMeta {
        #[serde(flatten)]
        info: serde_json::Value,
    },

    /// End the audio stream and discard the session buffer.
    #[serde(rename = "audio_end")]
    AudioEnd,
}

/// Messages the server pushes back over the same connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent once when the connection is established.
    #[serde(rename = "connected")]
    Connected {
        #[serde(rename = "connectionId")]
        connection_id: String,
    },

    /// Acknowledges an audio_start control message.
    #[serde(rename = "audio_start_ack")]
    AudioStartAck,

    /// A chunk has been accepted and handed to the transcriber.
    #[serde(rename = "processing")]
    Processing,

    /// The chunk was processed successfully but contained no speech.
    #[serde(rename = "silence")]
    Silence,

    /// One transcribed chunk.
    #[serde(rename = "transcript")]
    Transcript {
        text: String,
        lang: Lang,
        time: DateTime<Utc>,
    },

    /// A per-chunk or per-message failure. The connection stays open.
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_from_wire_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"audio_start","mimeType":"audio/webm"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::AudioStart { ref mime_type } if mime_type == "audio/webm"));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"audio_end"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::AudioEnd));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"chunk_meta","seq":3,"ms":5000}"#).unwrap();
        match msg {
            ClientMessage::ChunkMeta { info } => assert_eq!(info["seq"], 3),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn unknown_control_type_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"pause"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn transcript_message_serializes_lang_code() {
        let msg = ServerMessage::Transcript {
            text: "សួស្តី".to_string(),
            lang: Lang::Km,
            time: Utc::now(),
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"transcript""#));
        assert!(json.contains(r#""lang":"km""#));
    }
}
