//! Application settings structs, defaults and TOML loading.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every field has a default, so a partial `settings.toml` is valid.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable holding the service credential.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding [`OpenAiConfig::base_url`].
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable overriding [`ServerConfig::port`].
pub const ENV_PORT: &str = "PORT";
/// Environment variable pointing at an explicit `settings.toml`.
pub const ENV_CONFIG_PATH: &str = "VOICE_AGENT_CONFIG";

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port; overridden by `PORT`.
    pub port: u16,
    /// Largest accepted request body in bytes (the multipart upload).
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// OpenAiConfig
// ---------------------------------------------------------------------------

/// Connection settings shared by the three external capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Base URL of the OpenAI-compatible API, without the `/v1` suffix.
    pub base_url: String,
    /// Bearer credential. `None` means requests are sent unauthenticated
    /// and will most likely be rejected by the service.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds; `None` disables the timeout.
    pub timeout_secs: Option<u64>,
    /// Refuse to start when no credential is configured.
    pub require_api_key: bool,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            timeout_secs: None,
            require_api_key: false,
        }
    }
}

impl OpenAiConfig {
    /// The credential, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Build the shared `reqwest` client used by every stage adapter.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        builder.build()
    }

    /// `{base_url}/v1/{path}` with duplicate slashes removed at the seam.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// ---------------------------------------------------------------------------
// Stage configs
// ---------------------------------------------------------------------------

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Transcription model identifier.
    pub model: String,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "whisper-1".into(),
        }
    }
}

/// Chat-completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat model identifier.
    pub model: String,
    /// System instruction sent ahead of every transcript.
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            system_prompt: crate::llm::DEFAULT_SYSTEM_PROMPT.into(),
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Speech model identifier.
    pub model: String,
    /// Voice identifier.
    pub voice: String,
    /// Requested output encoding (`mp3`, `opus`, `aac`, `flac`, `wav`).
    pub format: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            model: "tts-1".into(),
            voice: "alloy".into(),
            format: "mp3".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RetryConfig / StagingConfig
// ---------------------------------------------------------------------------

/// Backoff policy applied to each stage invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per stage, including the first one.
    pub max_attempts: u32,
    /// Lower bound of every backoff delay, in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound of every backoff delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            min_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

/// Where request-scoped audio files are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Directory for staged files; `None` uses the system temp dir.
    pub dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub retry: RetryConfig,
    pub staging: StagingConfig,
}

impl AppConfig {
    /// Load `settings.toml` (from `VOICE_AGENT_CONFIG` or the platform config
    /// dir) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| AppPaths::new().settings_file);

        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.openai.base_url = url;
        }
        if let Some(raw) = lookup(ENV_PORT) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!(
                    "invalid {ENV_PORT}='{raw}', keeping port {}",
                    self.server.port
                ),
            }
        }
    }

    /// Startup credential check.
    ///
    /// With `require_api_key` unset a missing key only logs a warning and
    /// the first request fails with the service's rejection.
    pub fn check_credentials(&self) -> Result<()> {
        if self.openai.api_key().is_some() {
            return Ok(());
        }
        if self.openai.require_api_key {
            bail!("{ENV_API_KEY} is not set and openai.require_api_key is enabled");
        }
        log::warn!("{ENV_API_KEY} is not set; upstream calls will be rejected");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_values_match_upstream_constants() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.openai.base_url, "https://api.openai.com");
        assert!(cfg.openai.api_key.is_none());
        assert!(!cfg.openai.require_api_key);
        assert_eq!(cfg.stt.model, "whisper-1");
        assert_eq!(cfg.llm.model, "gpt-3.5-turbo");
        assert_eq!(cfg.llm.system_prompt, "You are a helpful voice assistant.");
        assert_eq!(cfg.tts.model, "tts-1");
        assert_eq!(cfg.tts.voice, "alloy");
        assert_eq!(cfg.tts.format, "mp3");
        assert_eq!(cfg.retry.max_attempts, 6);
        assert_eq!(cfg.retry.min_delay_ms, 1_000);
        assert_eq!(cfg.retry.max_delay_ms, 60_000);
        assert!(cfg.staging.dir.is_none());
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let config = AppConfig::load_from(&dir.path().join("nope.toml")).expect("load");
        assert_eq!(config.stt.model, "whisper-1");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn serialized_settings_load_back() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.server.port = 8080;
        cfg.openai.base_url = "http://localhost:11434".into();
        cfg.openai.timeout_secs = Some(30);
        cfg.tts.voice = "nova".into();
        cfg.retry.max_attempts = 3;
        cfg.staging.dir = Some(PathBuf::from("/var/tmp/voice"));

        let content = toml::to_string_pretty(&cfg).expect("serialize");
        std::fs::write(&path, content).expect("write");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.openai.base_url, "http://localhost:11434");
        assert_eq!(loaded.openai.timeout_secs, Some(30));
        assert_eq!(loaded.tts.voice, "nova");
        assert_eq!(loaded.retry.max_attempts, 3);
        assert_eq!(loaded.staging.dir, Some(PathBuf::from("/var/tmp/voice")));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[tts]\nvoice = \"echo\"\n").expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.tts.voice, "echo");
        assert_eq!(loaded.tts.model, "tts-1");
        assert_eq!(loaded.retry.max_attempts, 6);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "server = [").expect("write");
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn env_overrides_key_url_and_port() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_BASE_URL, "http://127.0.0.1:9000"),
            (ENV_PORT, "7000"),
        ]));

        assert_eq!(cfg.openai.api_key(), Some("sk-test"));
        assert_eq!(cfg.openai.base_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.server.port, 7000);
    }

    #[test]
    fn invalid_port_keeps_configured_value() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[(ENV_PORT, "not-a-port")]));
        assert_eq!(cfg.server.port, 5000);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let mut cfg = AppConfig::default();
        cfg.openai.api_key = Some("   ".into());
        assert!(cfg.openai.api_key().is_none());
    }

    #[test]
    fn missing_key_is_lazy_by_default() {
        let cfg = AppConfig::default();
        assert!(cfg.check_credentials().is_ok());
    }

    #[test]
    fn missing_key_fails_fast_when_required() {
        let mut cfg = AppConfig::default();
        cfg.openai.require_api_key = true;
        let err = cfg.check_credentials().unwrap_err();
        assert!(err.to_string().contains(ENV_API_KEY));

        cfg.openai.api_key = Some("sk-live".into());
        assert!(cfg.check_credentials().is_ok());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let mut cfg = OpenAiConfig::default();
        cfg.base_url = "http://localhost:1234/".into();
        assert_eq!(
            cfg.endpoint("/audio/speech"),
            "http://localhost:1234/v1/audio/speech"
        );
    }
}
