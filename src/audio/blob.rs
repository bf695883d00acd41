//! Request-scoped audio values: the uploaded clip and the synthesized reply.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::AudioFormat;

/// Audio uploaded by the caller.
#[derive(Debug, Clone)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

impl AudioBlob {
    pub fn new(bytes: impl Into<Vec<u8>>, format: AudioFormat) -> Self {
        Self {
            bytes: bytes.into(),
            format,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Audio produced by the synthesis stage.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

impl SynthesizedAudio {
    /// Standard, padded base64 for embedding in a JSON document.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}
