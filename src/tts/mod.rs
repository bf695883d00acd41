//! Text-to-speech stage.
//!
//! * [`SpeechSynthesizer`]: async trait the pipeline calls with the reply
//!   text and a staged destination file.
//! * [`OpenAiSynthesizer`]: production backend for any OpenAI-compatible
//!   speech endpoint.
//! * [`TtsError`]: error variants for the stage.

pub mod engine;
pub mod openai;

pub use engine::{SpeechSynthesizer, TtsError};
pub use openai::OpenAiSynthesizer;

#[cfg(test)]
pub use engine::MockSynthesizer;
