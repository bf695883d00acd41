//! Pipeline stages.
//!
//! A request moves through the stages in order and never goes back:
//!
//! ```text
//! Staging ──▶ Transcribing ──▶ Responding ──▶ Synthesizing ──▶ Encoding
//! ```
//!
//! The stage is only used to label log lines and errors; no state is kept
//! between requests.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Writing the upload to a temporary file.
    Staging,
    /// Speech-to-text on the staged upload.
    Transcribing,
    /// Chat completion on the transcript.
    Responding,
    /// Text-to-speech on the reply.
    Synthesizing,
    /// Reading the synthesized file back and base64-encoding it.
    Encoding,
}

impl PipelineStage {
    /// Short label for logs; also the retry label for the external stages.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Staging => "staging",
            PipelineStage::Transcribing => "transcription",
            PipelineStage::Responding => "completion",
            PipelineStage::Synthesizing => "synthesis",
            PipelineStage::Encoding => "encoding",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
