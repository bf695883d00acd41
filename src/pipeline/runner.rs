//! Pipeline runner: drives one upload through STT → LLM → TTS.
//!
//! # Pipeline flow
//!
//! ```text
//! AudioBlob
//!   └─▶ stage upload to temp file                      [Staging]
//!         └─▶ retry(stt.transcribe(path))              [Transcribing]
//!               └─▶ retry(llm.respond(transcript))     [Responding]
//!                     └─▶ reserve output temp file
//!                           └─▶ retry(tts.synthesize)  [Synthesizing]
//!                                 └─▶ read + base64    [Encoding]
//!                                       └─▶ ResponsePayload
//! ```
//!
//! Any error ends the run and comes back as a [`PipelineError`]; nothing
//! produced before the failure is returned. Both staged files are guarded
//! by [`StagedFile`] and removed on every exit path.
//!
//! [`StagedFile`]: crate::staging::StagedFile

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use thiserror::Error;

use crate::audio::{AudioBlob, SynthesizedAudio};
use crate::config::AppConfig;
use crate::llm::{ApiResponder, ChatResponder, LlmError};
use crate::retry::{retry, RetryPolicy};
use crate::staging::StagingArea;
use crate::stt::{OpenAiTranscriber, SttEngine, SttError};
use crate::tts::{OpenAiSynthesizer, SpeechSynthesizer, TtsError};

use super::payload::ResponsePayload;
use super::state::PipelineStage;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Why a run produced no payload.
///
/// Stage errors are wrapped transparently so their message reaches the
/// caller verbatim.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The upload carried no audio bytes.
    #[error("No audio file provided")]
    NoAudio,

    /// A temporary file could not be created, written or read back.
    #[error("{stage} failed: {source}")]
    Io {
        stage: PipelineStage,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transcription(#[from] SttError),

    #[error(transparent)]
    Completion(#[from] LlmError),

    #[error(transparent)]
    Synthesis(#[from] TtsError),
}

impl PipelineError {
    /// Stage the run was in when it failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::NoAudio => PipelineStage::Staging,
            PipelineError::Io { stage, .. } => *stage,
            PipelineError::Transcription(_) => PipelineStage::Transcribing,
            PipelineError::Completion(_) => PipelineStage::Responding,
            PipelineError::Synthesis(_) => PipelineStage::Synthesizing,
        }
    }

    /// `true` for failures caused by the request itself rather than by the
    /// service or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::NoAudio)
    }

    fn io(stage: PipelineStage) -> impl FnOnce(std::io::Error) -> Self {
        move |source| PipelineError::Io { stage, source }
    }
}

// ---------------------------------------------------------------------------
// VoicePipeline
// ---------------------------------------------------------------------------

/// The three stage backends plus the shared retry policy and staging area.
///
/// Holds no per-request state, so one instance behind an `Arc` serves any
/// number of concurrent requests.
pub struct VoicePipeline {
    stt: Arc<dyn SttEngine>,
    llm: Arc<dyn ChatResponder>,
    tts: Arc<dyn SpeechSynthesizer>,
    retry: RetryPolicy,
    staging: StagingArea,
}

impl VoicePipeline {
    pub fn new(
        stt: Arc<dyn SttEngine>,
        llm: Arc<dyn ChatResponder>,
        tts: Arc<dyn SpeechSynthesizer>,
        retry: RetryPolicy,
        staging: StagingArea,
    ) -> Self {
        Self {
            stt,
            llm,
            tts,
            retry,
            staging,
        }
    }

    /// Build the production pipeline: one shared HTTP client and the
    /// OpenAI-compatible backends for all three stages.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = config
            .openai
            .http_client()
            .context("building HTTP client")?;

        let stt = OpenAiTranscriber::new(client.clone(), &config.openai, &config.stt);
        let llm = ApiResponder::new(client.clone(), &config.openai, &config.llm);
        let tts = OpenAiSynthesizer::new(client, &config.openai, &config.tts)
            .context("invalid tts.format")?;

        Ok(Self::new(
            Arc::new(stt),
            Arc::new(llm),
            Arc::new(tts),
            RetryPolicy::from_config(&config.retry),
            StagingArea::from_config(&config.staging),
        ))
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run one upload through every stage.
    pub async fn run(&self, blob: AudioBlob) -> Result<ResponsePayload, PipelineError> {
        if blob.is_empty() {
            return Err(PipelineError::NoAudio);
        }

        let started = Instant::now();
        log::debug!("pipeline: {} bytes of {}", blob.len(), blob.format);

        // ── 1. Stage the upload ──────────────────────────────────────────
        let input = self
            .staging
            .stage(&blob.bytes, blob.format)
            .await
            .map_err(PipelineError::io(PipelineStage::Staging))?;

        // ── 2. Transcribe ────────────────────────────────────────────────
        let transcript = retry(&self.retry, PipelineStage::Transcribing.label(), || {
            self.stt.transcribe(input.path())
        })
        .await?;
        log::debug!("pipeline: transcript = {transcript:?}");

        // ── 3. Generate the reply ────────────────────────────────────────
        let reply = retry(&self.retry, PipelineStage::Responding.label(), || {
            self.llm.respond(&transcript)
        })
        .await?;
        log::debug!("pipeline: reply = {reply:?}");

        // ── 4. Synthesize into a second staged file ──────────────────────
        let format = self.tts.format();
        let output = self
            .staging
            .reserve(format)
            .await
            .map_err(PipelineError::io(PipelineStage::Synthesizing))?;

        retry(&self.retry, PipelineStage::Synthesizing.label(), || {
            self.tts.synthesize(&reply, output.path())
        })
        .await?;

        // ── 5. Read back and encode ──────────────────────────────────────
        let bytes = output
            .read()
            .await
            .map_err(PipelineError::io(PipelineStage::Encoding))?;
        let audio = SynthesizedAudio { bytes, format };

        log::info!(
            "pipeline: completed in {:.2?} (transcript {} chars, reply {} chars, {} bytes of {})",
            started.elapsed(),
            transcript.len(),
            reply.len(),
            audio.bytes.len(),
            audio.format
        );

        Ok(ResponsePayload {
            text_response: reply,
            audio_base64: audio.to_base64(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;
    use crate::llm::MockResponder;
    use crate::stt::MockSttEngine;
    use crate::tts::MockSynthesizer;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    struct Harness {
        pipeline: VoicePipeline,
        stt: Arc<MockSttEngine>,
        llm: Arc<MockResponder>,
        tts: Arc<MockSynthesizer>,
        dir: TempDir,
    }

    fn harness(stt: MockSttEngine, llm: MockResponder, tts: MockSynthesizer) -> Harness {
        let dir = tempdir().unwrap();
        let stt = Arc::new(stt);
        let llm = Arc::new(llm);
        let tts = Arc::new(tts);
        let pipeline = VoicePipeline::new(
            stt.clone(),
            llm.clone(),
            tts.clone(),
            RetryPolicy::immediate(6),
            StagingArea::new(dir.path()),
        );
        Harness {
            pipeline,
            stt,
            llm,
            tts,
            dir,
        }
    }

    fn wav(bytes: &[u8]) -> AudioBlob {
        AudioBlob::new(bytes.to_vec(), AudioFormat::Wav)
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn success_returns_reply_and_decodable_audio() {
        let h = harness(
            MockSttEngine::ok("what is the weather"),
            MockResponder::ok("It is sunny."),
            MockSynthesizer::ok(),
        );

        let payload = h.pipeline.run(wav(b"RIFF audio")).await.unwrap();

        assert_eq!(payload.text_response, "It is sunny.");
        let audio = STANDARD.decode(&payload.audio_base64).unwrap();
        assert!(!audio.is_empty());
        assert_eq!(audio, MockSynthesizer::audio_for("It is sunny."));
        assert_eq!(h.llm.seen_transcripts(), vec!["what is the weather"]);
    }

    #[tokio::test]
    async fn staged_files_are_removed_after_success() {
        let h = harness(
            MockSttEngine::ok("hi"),
            MockResponder::ok("hello"),
            MockSynthesizer::ok(),
        );

        h.pipeline.run(wav(b"RIFF audio")).await.unwrap();

        let staged_input = &h.stt.seen_paths()[0];
        let staged_output = &h.tts.seen_paths()[0];
        assert_ne!(staged_input, staged_output);
        assert!(!staged_input.exists());
        assert!(!staged_output.exists());
        assert!(dir_is_empty(h.dir.path()));
    }

    #[tokio::test]
    async fn staged_input_keeps_declared_extension() {
        let h = harness(
            MockSttEngine::ok("hi"),
            MockResponder::ok("hello"),
            MockSynthesizer::ok(),
        );

        h.pipeline
            .run(AudioBlob::new(b"ID3 clip".to_vec(), AudioFormat::Mp3))
            .await
            .unwrap();

        let staged = &h.stt.seen_paths()[0];
        assert_eq!(staged.extension().unwrap(), "mp3");
        assert_eq!(h.tts.seen_paths()[0].extension().unwrap(), "mp3");
    }

    #[tokio::test]
    async fn empty_audio_is_rejected_before_any_stage() {
        let h = harness(
            MockSttEngine::ok("hi"),
            MockResponder::ok("hello"),
            MockSynthesizer::ok(),
        );

        let err = h.pipeline.run(wav(b"")).await.unwrap_err();

        assert!(matches!(err, PipelineError::NoAudio));
        assert!(err.is_client_error());
        assert_eq!(h.stt.calls(), 0);
        assert!(dir_is_empty(h.dir.path()));
    }

    #[tokio::test]
    async fn transcription_exhaustion_skips_later_stages() {
        let h = harness(
            MockSttEngine::failing(6, "never"),
            MockResponder::ok("unused"),
            MockSynthesizer::ok(),
        );

        let err = h.pipeline.run(wav(b"RIFF audio")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Transcription(_)));
        assert_eq!(err.stage(), PipelineStage::Transcribing);
        assert!(!err.is_client_error());
        assert_eq!(h.stt.calls(), 6);
        assert_eq!(h.llm.calls(), 0);
        assert_eq!(h.tts.calls(), 0);
        assert!(dir_is_empty(h.dir.path()));
    }

    #[tokio::test]
    async fn five_failures_then_success_completes() {
        let h = harness(
            MockSttEngine::failing(5, "finally"),
            MockResponder::ok("done"),
            MockSynthesizer::ok(),
        );

        let payload = h.pipeline.run(wav(b"RIFF audio")).await.unwrap();

        assert_eq!(payload.text_response, "done");
        assert_eq!(h.stt.calls(), 6);
        // Every attempt reads the same staged file.
        let paths = h.stt.seen_paths();
        assert!(paths.iter().all(|p| p == &paths[0]));
    }

    #[tokio::test]
    async fn completion_error_message_is_passed_through() {
        let h = harness(
            MockSttEngine::ok("hi"),
            MockResponder::failing(6, "unused"),
            MockSynthesizer::ok(),
        );

        let err = h.pipeline.run(wav(b"RIFF audio")).await.unwrap_err();

        assert_eq!(err.to_string(), "chat service returned 500: chat unavailable (call 6)");
        assert_eq!(err.stage(), PipelineStage::Responding);
        assert_eq!(h.tts.calls(), 0);
        assert!(dir_is_empty(h.dir.path()));
    }

    #[tokio::test]
    async fn synthesis_failure_discards_reply_and_cleans_up() {
        let h = harness(
            MockSttEngine::ok("hi"),
            MockResponder::ok("a reply nobody hears"),
            MockSynthesizer::failing(6),
        );

        let err = h.pipeline.run(wav(b"RIFF audio")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Synthesis(_)));
        assert_eq!(h.tts.calls(), 6);
        assert!(!h.tts.seen_paths()[0].exists());
        assert!(dir_is_empty(h.dir.path()));
    }

    #[tokio::test]
    async fn staging_failure_is_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let stt = Arc::new(MockSttEngine::ok("hi"));
        let pipeline = VoicePipeline::new(
            stt.clone(),
            Arc::new(MockResponder::ok("hello")),
            Arc::new(MockSynthesizer::ok()),
            RetryPolicy::immediate(6),
            StagingArea::new(blocker.join("staging")),
        );

        let err = pipeline.run(wav(b"RIFF audio")).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Io {
                stage: PipelineStage::Staging,
                ..
            }
        ));
        assert_eq!(stt.calls(), 0);
    }

    /// Swaps the staged upload for a non-empty directory after reading it,
    /// so removing the staged path fails with something other than
    /// `NotFound`.
    struct DirSwappingStt;

    #[async_trait::async_trait]
    impl SttEngine for DirSwappingStt {
        async fn transcribe(&self, audio: &Path) -> Result<String, SttError> {
            std::fs::remove_file(audio).unwrap();
            std::fs::create_dir(audio).unwrap();
            std::fs::write(audio.join("keep"), b"x").unwrap();
            Ok("hello".into())
        }
    }

    #[tokio::test]
    async fn cleanup_failure_still_returns_payload() {
        let dir = tempdir().unwrap();
        let pipeline = VoicePipeline::new(
            Arc::new(DirSwappingStt),
            Arc::new(MockResponder::ok("hi there")),
            Arc::new(MockSynthesizer::ok()),
            RetryPolicy::immediate(6),
            StagingArea::new(dir.path()),
        );

        let payload = pipeline.run(wav(b"RIFF audio")).await.unwrap();

        assert_eq!(payload.text_response, "hi there");
        assert_eq!(
            STANDARD.decode(&payload.audio_base64).unwrap(),
            MockSynthesizer::audio_for("hi there")
        );
        // The swapped-in directory survives; the synthesized file does not.
        let left: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(left.len(), 1);
        assert!(left[0].is_dir());
    }

    #[tokio::test]
    async fn concurrent_runs_do_not_mix_results() {
        let h = harness(
            MockSttEngine::echo(),
            MockResponder::prefixed("you said: "),
            MockSynthesizer::ok(),
        );

        let (a, b) = tokio::join!(
            h.pipeline.run(wav(b"first clip")),
            h.pipeline.run(wav(b"second clip")),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.text_response, "you said: first clip");
        assert_eq!(b.text_response, "you said: second clip");
        assert_eq!(
            STANDARD.decode(&b.audio_base64).unwrap(),
            MockSynthesizer::audio_for("you said: second clip")
        );
        assert!(dir_is_empty(h.dir.path()));
    }
}
