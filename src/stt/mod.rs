//! Speech-to-text stage.
//!
//! * [`SttEngine`]: async trait the pipeline calls with a staged file.
//! * [`OpenAiTranscriber`]: production backend for any OpenAI-compatible
//!   transcription endpoint.
//! * [`SttError`]: error variants for the stage.

pub mod engine;
pub mod openai;

pub use engine::{SttEngine, SttError};
pub use openai::OpenAiTranscriber;

#[cfg(test)]
pub use engine::MockSttEngine;
