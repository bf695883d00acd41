//! Voice pipeline: upload → transcript → reply → speech.
//!
//! # Architecture
//!
//! ```text
//! POST /voice-agent
//!        │
//!        ▼
//! VoicePipeline::run(AudioBlob)
//!        │
//!        ├─ StagingArea::stage            → staged upload
//!        ├─ retry(SttEngine::transcribe)  → transcript
//!        ├─ retry(ChatResponder::respond) → reply
//!        ├─ retry(SpeechSynthesizer)      → staged speech
//!        └─ base64                        → ResponsePayload
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_agent::audio::{AudioBlob, AudioFormat};
//! use voice_agent::config::AppConfig;
//! use voice_agent::pipeline::VoicePipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = VoicePipeline::from_config(&AppConfig::load()?)?;
//!     let clip = std::fs::read("question.wav")?;
//!
//!     let payload = pipeline.run(AudioBlob::new(clip, AudioFormat::Wav)).await?;
//!     println!("{}", payload.text_response);
//!     Ok(())
//! }
//! ```

pub mod payload;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use payload::{ErrorPayload, ResponsePayload};
pub use runner::{PipelineError, VoicePipeline};
pub use state::PipelineStage;
