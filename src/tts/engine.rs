//! Core TTS trait and error type.
//!
//! [`SpeechSynthesizer`] writes audio for a piece of text into a file the
//! caller has staged. Writing to a file rather than returning bytes lets
//! the HTTP backend stream the response body straight to disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::AudioFormat;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// Errors that can arise from the synthesis stage.
#[derive(Debug, Error)]
pub enum TtsError {
    /// HTTP transport or connection error.
    #[error("speech request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("speech service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The synthesized audio could not be written to the staged file.
    #[error("failed to write synthesized audio to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The service returned a success status with no audio.
    #[error("speech service returned no audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        TtsError::Request(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Text-to-speech capability.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Encoding of the audio [`synthesize`](Self::synthesize) produces.
    fn format(&self) -> AudioFormat;

    /// Synthesize `text` into `dest`, replacing any previous contents.
    /// Returns the number of bytes written.
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<u64, TtsError>;
}

// ---------------------------------------------------------------------------
// MockSynthesizer
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockSynthesizer;
