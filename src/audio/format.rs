//! Audio encodings understood by the upstream speech services.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Container / codec of an audio payload.
///
/// Only the encodings the OpenAI audio endpoints accept are listed; the
/// value decides the staged file's extension, which is how the
/// transcription service sniffs the input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
    Ogg,
    Opus,
    Webm,
    M4a,
    Aac,
    Flac,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::Wav
    }
}

impl AudioFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Webm => "webm",
            Self::M4a => "m4a",
            Self::Aac => "aac",
            Self::Flac => "flac",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Opus => "audio/opus",
            Self::Webm => "audio/webm",
            Self::M4a => "audio/mp4",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
        }
    }

    /// Match a file extension, case-insensitively. `mpeg`/`mpga` map to mp3.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let format = match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "wav" | "wave" => Self::Wav,
            "mp3" | "mpeg" | "mpga" => Self::Mp3,
            "ogg" | "oga" => Self::Ogg,
            "opus" => Self::Opus,
            "webm" => Self::Webm,
            "m4a" | "mp4" => Self::M4a,
            "aac" => Self::Aac,
            "flac" => Self::Flac,
            _ => return None,
        };
        Some(format)
    }

    /// Match a MIME type; parameters such as `;codecs=opus` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        let format = match essence.as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Self::Wav,
            "audio/mpeg" | "audio/mp3" => Self::Mp3,
            "audio/ogg" => Self::Ogg,
            "audio/opus" => Self::Opus,
            "audio/webm" | "video/webm" => Self::Webm,
            "audio/mp4" | "audio/x-m4a" | "audio/m4a" => Self::M4a,
            "audio/aac" => Self::Aac,
            "audio/flac" | "audio/x-flac" => Self::Flac,
            _ => return None,
        };
        Some(format)
    }

    /// Declared encoding of an upload: the file name's extension wins, then
    /// the part's content type, then wav.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Self {
        file_name
            .and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, ext)| Self::from_extension(ext))
            .or_else(|| content_type.and_then(Self::from_mime))
            .unwrap_or_default()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Error returned when a configured format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported audio format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for AudioFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| UnknownFormat(s.to_string()))
    }
}
