//! Core STT trait and error type.
//!
//! [`SttEngine`] is the public interface used by the pipeline. It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn SttEngine>`.
//!
//! [`MockSttEngine`] (available under `#[cfg(test)]`) is a stub that can
//! echo the staged file, return a fixed transcript, or fail a set number of
//! times first. It lets the pipeline and server tests run without network
//! access.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the transcription stage.
#[derive(Debug, Error)]
pub enum SttError {
    /// The staged audio file could not be read.
    #[error("failed to read staged audio {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP transport or connection error.
    #[error("transcription request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("transcription service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("failed to parse transcription response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SttError {
    fn from(e: reqwest::Error) -> Self {
        SttError::Request(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// SttEngine trait
// ---------------------------------------------------------------------------

/// Speech-to-text capability.
///
/// `audio` is the path of a staged file whose extension names its encoding.
/// The file is owned by the caller and outlives the call.
#[async_trait]
pub trait SttEngine: Send + Sync {
    /// Transcribe the staged audio and return the plain-text transcript.
    async fn transcribe(&self, audio: &Path) -> Result<String, SttError>;
}

// ---------------------------------------------------------------------------
// MockSttEngine
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockSttEngine;


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
