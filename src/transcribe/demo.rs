use super::gateway::{TranscribeError, Transcriber, Transcription};
use super::language::Lang;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Canned transcripts served when no upstream capability is configured,
/// alternating English and Khmer so the language path is exercised too.
pub const DEMO_PHRASES: &[(&str, Lang)] = &[
    ("Welcome everyone, let's get started with today's meeting.", Lang::En),
    ("សូមស្វាគមន៍ទាំងអស់គ្នា តោះចាប់ផ្តើមកិច្ចប្រជុំថ្ងៃនេះ។", Lang::Km),
    ("The first item on the agenda is the quarterly report.", Lang::En),
    ("របៀបវារៈទីមួយគឺរបាយការណ៍ប្រចាំត្រីមាស។", Lang::Km),
    ("Does anyone have questions before we move on?", Lang::En),
    ("តើមាននរណាមានសំណួរមុនពេលយើងបន្តទៀតទេ?", Lang::Km),
    ("Let's schedule a follow-up for next week.", Lang::En),
    ("តោះកំណត់ពេលប្រជុំបន្តនៅសប្តាហ៍ក្រោយ។", Lang::Km),
];

/// Duration reported for each demo phrase, matching the client's fixed
/// recording cadence.
const DEMO_CHUNK_SECS: f64 = 5.0;

/// Fallback transcriber used when no API key is configured.
///
/// Deterministic round-robin over `DEMO_PHRASES`: one process-wide
/// counter shared across all connections, reset only by restart.
pub struct DemoTranscriber {
    counter: AtomicUsize,
}

impl DemoTranscriber {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }

    /// Return the next phrase in the cycle and advance the counter.
    pub fn next_phrase(&self) -> (&'static str, Lang) {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % DEMO_PHRASES.len();
        DEMO_PHRASES[index]
    }
}

impl Default for DemoTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcriber for DemoTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _mime_type: &str,
    ) -> Result<Transcription, TranscribeError> {
        let (text, lang) = self.next_phrase();

        debug!("Demo mode: serving canned {} transcript", lang.code());

        Ok(Transcription {
            text: text.to_string(),
            lang,
            duration_secs: DEMO_CHUNK_SECS,
        })
    }

    fn is_live(&self) -> bool {
        false
    }
}
