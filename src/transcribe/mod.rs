//! Speech-to-text gateway and its demo-mode substitute.
//!
//! The `Transcriber` trait is the seam between the chunk pipeline and
//! whatever produces text: `WhisperGateway` for a live upstream
//! capability, `DemoTranscriber` when none is configured. Language
//! normalization lives here because the upstream language tag alone is
//! not trusted.

mod demo;
mod gateway;
mod language;

pub use demo::{DemoTranscriber, DEMO_PHRASES};
pub use gateway::{
    extension_for_mime, write_transient_chunk, TranscribeError, Transcriber, Transcription,
    WhisperGateway,
};
pub use language::{normalize, Lang};
