//! `OpenAiTranscriber`: calls an OpenAI-compatible
//! `/v1/audio/transcriptions` endpoint.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::audio::AudioFormat;
use crate::config::{OpenAiConfig, SttConfig};
use crate::stt::engine::{SttEngine, SttError};

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Uploads the staged file as multipart `file` together with the model name.
pub struct OpenAiTranscriber {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(client: reqwest::Client, openai: &OpenAiConfig, stt: &SttConfig) -> Self {
        Self {
            client,
            url: openai.endpoint("audio/transcriptions"),
            api_key: openai.api_key().map(str::to_string),
            model: stt.model.clone(),
        }
    }
}

#[async_trait]
impl SttEngine for OpenAiTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, SttError> {
        let bytes = tokio::fs::read(audio).await.map_err(|source| SttError::Io {
            path: audio.to_path_buf(),
            source,
        })?;

        let format = audio
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(AudioFormat::from_extension)
            .unwrap_or_default();
        let file_name = audio
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("audio.{}", format.extension()));

        log::debug!("stt: uploading {} bytes as {file_name}", bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(format.mime_type())?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let mut req = self.client.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SttError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SttError::Parse(e.to_string()))?;

        log::debug!("stt: transcribed {} chars", parsed.text.len());
        Ok(parsed.text)
    }
}
