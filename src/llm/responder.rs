//! Core `ChatResponder` trait and `ApiResponder` implementation.
//!
//! `ApiResponder` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint. All connection details come from [`OpenAiConfig`] and
//! [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{LlmConfig, OpenAiConfig};
use crate::llm::prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while generating a reply.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("chat request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("chat request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("chat service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse chat response: {0}")]
    Parse(String),

    /// The first choice carried no usable text.
    #[error("chat service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ChatResponder trait
// ---------------------------------------------------------------------------

/// Conversational-completion capability.
///
/// Implementors must be `Send + Sync` so they can be shared across request
/// tasks behind an `Arc<dyn ChatResponder>`.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    /// Produce a reply to `transcript`. Each call is independent.
    async fn respond(&self, transcript: &str) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiResponder
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiResponder {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    prompt_builder: PromptBuilder,
}

impl ApiResponder {
    pub fn new(client: reqwest::Client, openai: &OpenAiConfig, llm: &LlmConfig) -> Self {
        Self {
            client,
            url: openai.endpoint("chat/completions"),
            api_key: openai.api_key().map(str::to_string),
            model: llm.model.clone(),
            prompt_builder: PromptBuilder::new(&llm.system_prompt),
        }
    }
}

#[async_trait]
impl ChatResponder for ApiResponder {
    /// Send the system instruction and `transcript`; return the first
    /// choice's message content.
    async fn respond(&self, transcript: &str) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model":    self.model,
            "messages": self.prompt_builder.build_messages(transcript),
        });

        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?
            .to_string();

        if reply.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        log::debug!("llm: reply of {} chars", reply.len());
        Ok(reply)
    }
}

// ---------------------------------------------------------------------------
// MockResponder
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockResponder;


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
