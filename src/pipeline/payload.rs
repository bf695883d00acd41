//! JSON bodies returned to the caller.

use serde::{Deserialize, Serialize};

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub text_response: String,
    /// Standard padded base64 of the synthesized audio.
    pub audio_base64: String,
}

/// Uniform failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
