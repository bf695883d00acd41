//! Chat message construction for the response-generation stage.
//!
//! Every request is a fresh two-message exchange: the fixed system
//! instruction followed by the transcript as the user turn. Nothing from a
//! previous request is carried over.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

/// Instruction sent ahead of every transcript unless configured otherwise.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful voice assistant.";

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// One role-tagged entry of an OpenAI-style `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds the `[system, user]` message pair for a transcript.
///
/// ```rust
/// use voice_agent::llm::PromptBuilder;
///
/// let builder = PromptBuilder::default();
/// let messages = builder.build_messages("what's the weather like?");
/// assert_eq!(messages[0].role, "system");
/// assert_eq!(messages[1].content, "what's the weather like?");
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl PromptBuilder {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The transcript is passed through verbatim as the user turn.
    pub fn build_messages(&self, transcript: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(transcript),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
