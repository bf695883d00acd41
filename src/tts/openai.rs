//! `OpenAiSynthesizer`: calls an OpenAI-compatible `/v1/audio/speech`
//! endpoint and streams the returned audio to disk.

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::audio::{AudioFormat, UnknownFormat};
use crate::config::{OpenAiConfig, TtsConfig};
use crate::tts::engine::{SpeechSynthesizer, TtsError};

/// Encodings the speech endpoint can return.
const SPEECH_FORMATS: [AudioFormat; 5] = [
    AudioFormat::Mp3,
    AudioFormat::Opus,
    AudioFormat::Aac,
    AudioFormat::Flac,
    AudioFormat::Wav,
];

pub struct OpenAiSynthesizer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
    format: AudioFormat,
}

impl OpenAiSynthesizer {
    /// Fails when `tts.format` is not one of the speech endpoint's output
    /// encodings.
    pub fn new(
        client: reqwest::Client,
        openai: &OpenAiConfig,
        tts: &TtsConfig,
    ) -> Result<Self, UnknownFormat> {
        let format: AudioFormat = tts.format.parse()?;
        if !SPEECH_FORMATS.contains(&format) {
            return Err(UnknownFormat(tts.format.clone()));
        }

        Ok(Self {
            client,
            url: openai.endpoint("audio/speech"),
            api_key: openai.api_key().map(str::to_string),
            model: tts.model.clone(),
            voice: tts.voice.clone(),
            format,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    fn format(&self) -> AudioFormat {
        self.format
    }

    async fn synthesize(&self, text: &str, dest: &Path) -> Result<u64, TtsError> {
        let body = serde_json::json!({
            "model":           self.model,
            "voice":           self.voice,
            "input":           text,
            "response_format": self.format.extension(),
        });

        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let io_err = |source| TtsError::Io {
            path: dest.to_path_buf(),
            source,
        };

        // `create` truncates, so a retried attempt never appends to a
        // partial body from the previous one.
        let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_err)?;

        if written == 0 {
            return Err(TtsError::EmptyAudio);
        }

        log::debug!(
            "tts: wrote {written} bytes of {} (voice={}, model={})",
            self.format,
            self.voice,
            self.model
        );
        Ok(written)
    }
}
