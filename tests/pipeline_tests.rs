// Integration tests for the per-chunk processing pipeline.
//
// These drive process_chunk with mock transcribers and verify the
// message contract: a processing status followed by exactly one of
// transcript / silence / error per frame, with transient storage cleaned
// up on every path.

use async_trait::async_trait;
use meetscribe::transcribe::{
    DemoTranscriber, Lang, TranscribeError, Transcriber, Transcription, DEMO_PHRASES,
};
use meetscribe::ws::{process_chunk, ConnectionSession, ServerMessage};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

const MAX_PAYLOAD: usize = 25 * 1024 * 1024;

/// Returns fixed text without touching the filesystem or network.
struct FixedTranscriber {
    text: &'static str,
    lang: Lang,
    live: bool,
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _mime_type: &str,
    ) -> Result<Transcription, TranscribeError> {
        Ok(Transcription {
            text: self.text.to_string(),
            lang: self.lang,
            duration_secs: 5.0,
        })
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

/// Always fails, simulating an unreachable upstream capability.
struct FailingTranscriber {
    live: bool,
}

#[async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _mime_type: &str,
    ) -> Result<Transcription, TranscribeError> {
        Err(TranscribeError::Upstream(anyhow::anyhow!(
            "upstream unavailable"
        )))
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

async fn run_chunk(
    transcriber: Arc<dyn Transcriber>,
    frame: Vec<u8>,
) -> Vec<ServerMessage> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    process_chunk(transcriber, frame, "audio/webm".to_string(), MAX_PAYLOAD, tx).await;

    let mut messages = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        messages.push(msg);
    }
    messages
}

fn result_messages(messages: &[ServerMessage]) -> Vec<&ServerMessage> {
    messages
        .iter()
        .filter(|m| {
            matches!(
                m,
                ServerMessage::Transcript { .. } | ServerMessage::Silence | ServerMessage::Error { .. }
            )
        })
        .collect()
}

#[tokio::test]
async fn successful_chunk_emits_processing_then_one_transcript() {
    let transcriber = Arc::new(FixedTranscriber {
        text: "hello world",
        lang: Lang::En,
        live: false,
    });

    let messages = run_chunk(transcriber, vec![1u8; 1024]).await;

    assert!(matches!(messages[0], ServerMessage::Processing));
    let results = result_messages(&messages);
    assert_eq!(results.len(), 1, "exactly one result per frame");
    match results[0] {
        ServerMessage::Transcript { text, lang, .. } => {
            assert_eq!(text, "hello world");
            assert_eq!(*lang, Lang::En);
        }
        other => panic!("expected transcript, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_text_emits_exactly_one_silence() {
    let transcriber = Arc::new(FixedTranscriber {
        text: "",
        lang: Lang::En,
        live: false,
    });

    let messages = run_chunk(transcriber, vec![1u8; 1024]).await;

    let results = result_messages(&messages);
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], ServerMessage::Silence));
}

#[tokio::test]
async fn failed_chunk_emits_exactly_one_error() {
    let transcriber = Arc::new(FailingTranscriber { live: false });

    let messages = run_chunk(transcriber, vec![1u8; 1024]).await;

    let results = result_messages(&messages);
    assert_eq!(results.len(), 1);
    match results[0] {
        ServerMessage::Error { message } => {
            assert!(message.contains("transcription failed"), "got: {}", message)
        }
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn oversize_frame_is_rejected_with_one_error() {
    let transcriber = Arc::new(FixedTranscriber {
        text: "should never run",
        lang: Lang::En,
        live: false,
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    process_chunk(transcriber, vec![0u8; 64], "audio/webm".to_string(), 32, tx).await;

    let mut messages = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        messages.push(msg);
    }

    let results = result_messages(&messages);
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], ServerMessage::Error { .. }));
}

fn transient_chunk_files() -> Vec<PathBuf> {
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.starts_with("meetscribe-chunk-"))
                        .unwrap_or(false)
                })
                .collect()
        })
        .unwrap_or_default()
}

// The only test using live-mode mocks, so temp-dir scans are not racing
// against other tests in this binary.
#[tokio::test]
async fn transient_storage_is_released_on_success_and_failure() {
    let success: Arc<dyn Transcriber> = Arc::new(FixedTranscriber {
        text: "ok",
        lang: Lang::En,
        live: true,
    });
    let messages = run_chunk(success, vec![7u8; 2048]).await;
    assert_eq!(result_messages(&messages).len(), 1);
    assert!(
        transient_chunk_files().is_empty(),
        "temp chunk leaked after success"
    );

    let failure: Arc<dyn Transcriber> = Arc::new(FailingTranscriber { live: true });
    let messages = run_chunk(failure, vec![7u8; 2048]).await;
    assert_eq!(result_messages(&messages).len(), 1);
    assert!(
        transient_chunk_files().is_empty(),
        "temp chunk leaked after failure"
    );
}

#[tokio::test]
async fn disconnect_mid_processing_is_harmless() {
    let transcriber: Arc<dyn Transcriber> = Arc::new(FixedTranscriber {
        text: "nobody is listening",
        lang: Lang::En,
        live: false,
    });

    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx); // client already gone

    // Must complete without panicking; the result is simply not delivered.
    process_chunk(
        transcriber,
        vec![1u8; 512],
        "audio/webm".to_string(),
        MAX_PAYLOAD,
        tx,
    )
    .await;
}

#[tokio::test]
async fn demo_mode_scenario_first_chunk_returns_first_phrase() {
    // Client starts a stream, then sends a 50 KB frame with no upstream
    // capability configured.
    let mut session = ConnectionSession::new();
    let ack = session.handle_text(r#"{"type":"audio_start","mimeType":"audio/webm"}"#);
    assert!(matches!(ack, Some(ServerMessage::AudioStartAck)));

    let demo: Arc<dyn Transcriber> = Arc::new(DemoTranscriber::new());
    let mime = session.resolve_mime_type("audio/webm");
    let messages = {
        let (tx, mut rx) = mpsc::unbounded_channel();
        process_chunk(demo, vec![0u8; 50 * 1024], mime, MAX_PAYLOAD, tx).await;
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    };

    let results = result_messages(&messages);
    assert_eq!(results.len(), 1);
    match results[0] {
        ServerMessage::Transcript { text, lang, .. } => {
            assert_eq!(text, DEMO_PHRASES[0].0);
            assert_eq!(*lang, DEMO_PHRASES[0].1);
        }
        other => panic!("expected transcript, got {:?}", other),
    }
}

#[tokio::test]
async fn frame_without_audio_start_uses_default_mime_and_still_answers() {
    let session = ConnectionSession::new();
    let mime = session.resolve_mime_type("audio/webm");
    assert_eq!(mime, "audio/webm");

    let transcriber: Arc<dyn Transcriber> = Arc::new(FixedTranscriber {
        text: "still works",
        lang: Lang::En,
        live: false,
    });

    let messages = run_chunk(transcriber, vec![3u8; 256]).await;
    assert_eq!(result_messages(&messages).len(), 1);
}
