//! Text-to-speech.
//!
//! The synthesizer is a collaborator behind [`SpeechSynthesizer`]. When it
//! fails, clients are told to fall back to browser-side synthesis.

pub mod handlers;

use axum::body::Bytes;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech provider unavailable")]
    Unavailable,

    #[error("Speech provider error: {0}")]
    Provider(String),
}

/// Turns text into encoded audio.
pub trait SpeechSynthesizer: Send + Sync {
    /// MIME type of the audio produced.
    fn content_type(&self) -> &'static str {
        "audio/mpeg"
    }

    fn synthesize<'a>(&'a self, request: &'a SpeechRequest) -> BoxFuture<'a, Result<Bytes, SpeechError>>;
}

/// Synthesizer used when no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSynthesizer;

impl SpeechSynthesizer for UnavailableSynthesizer {
    fn synthesize<'a>(&'a self, _request: &'a SpeechRequest) -> BoxFuture<'a, Result<Bytes, SpeechError>> {
        Box::pin(async { Err(SpeechError::Unavailable) })
    }
}
