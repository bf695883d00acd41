//! Configuration for the voice agent.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the server,
//! the upstream API and each stage, `AppPaths` for the platform config
//! directory, and TOML loading with environment overrides.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, LlmConfig, OpenAiConfig, RetryConfig, ServerConfig, StagingConfig, SttConfig,
    TtsConfig, ENV_API_KEY, ENV_BASE_URL, ENV_CONFIG_PATH, ENV_PORT,
};
