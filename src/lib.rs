//! Voice relay: a recorded question goes in, a spoken answer comes out.
//!
//! Each upload is transcribed, answered by a chat model and synthesised back
//! to speech. The three upstream calls are retried independently and any
//! files staged along the way are removed however the request ends.

pub mod audio;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod retry;
pub mod server;
pub mod staging;
pub mod stt;
pub mod tts;
