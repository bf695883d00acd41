//! Audio payload types.
//!
//! The service never decodes audio itself; it only needs to know which
//! encoding a payload claims to be so the upstream APIs receive a sensible
//! file name, and to move synthesized bytes through JSON as base64.

pub mod blob;
pub mod format;

pub use blob::{AudioBlob, SynthesizedAudio};
pub use format::{AudioFormat, UnknownFormat};
