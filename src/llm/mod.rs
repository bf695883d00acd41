//! Response-generation stage.
//!
//! This module provides:
//! * [`ChatResponder`]: async trait implemented by all reply backends.
//! * [`ApiResponder`]: OpenAI-compatible chat-completions backend.
//! * [`PromptBuilder`] / [`ChatMessage`]: the `[system, user]` exchange.
//! * [`LlmError`]: error variants for the stage.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_agent::config::AppConfig;
//! use voice_agent::llm::{ApiResponder, ChatResponder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = config.openai.http_client().unwrap();
//!     let responder = ApiResponder::new(client, &config.openai, &config.llm);
//!
//!     let reply = responder.respond("what's the capital of France?").await.unwrap();
//!     println!("{reply}");
//! }
//! ```

pub mod prompt;
pub mod responder;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use prompt::{ChatMessage, PromptBuilder, DEFAULT_SYSTEM_PROMPT};
pub use responder::{ApiResponder, ChatResponder, LlmError};

#[cfg(test)]
pub use responder::MockResponder;
