//! Application entry point for the voice agent server.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk and the environment (defaults on failure).
//! 3. Check credentials.
//! 4. Build the [`VoicePipeline`] (shared HTTP client, retry policy, staging).
//! 5. Build the router and bind the listener.
//! 6. Serve until Ctrl-C or SIGTERM.

use anyhow::Context;
use tokio::net::TcpListener;
use voice_agent::{
    config::AppConfig,
    pipeline::VoicePipeline,
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice agent starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        let mut config = AppConfig::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    });

    // 3. Credentials
    config.check_credentials()?;

    // 4. Pipeline
    let pipeline = VoicePipeline::from_config(&config)?;
    log::info!(
        "pipeline ready: stt={} llm={} tts={}/{} attempts={}",
        config.stt.model,
        config.llm.model,
        config.tts.model,
        config.tts.voice,
        pipeline.retry_policy().max_attempts,
    );

    // 5. Router + listener
    let app = server::create_router(AppState::new(pipeline), &config.server);
    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("listening on http://{addr}");

    // 6. Serve
    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await
        .context("server error")?;

    log::info!("voice agent stopped");
    Ok(())
}
