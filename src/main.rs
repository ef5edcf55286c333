//! Application entry point: Robotalk drafting backend.
//!
//! # Startup sequence
//!
//! 1. Read `.env` (if present) into the process environment.
//! 2. Initialise logging.
//! 3. Load [`AppConfig`] from `ROBOTALK_CONFIG` or the platform settings
//!    file (defaults on first run), then apply environment overrides.
//! 4. Build the model client, drafting engine and transcriber.
//! 5. Serve HTTP until the process is stopped.

use anyhow::Context;
use robotalk::config::{AppConfig, AppPaths};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env
    let dotenv = dotenvy::dotenv();

    // 2. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Robotalk API starting up");
    if let Ok(path) = dotenv {
        log::info!("Loaded environment from {}", path.display());
    }

    // 3. Configuration
    let settings_file = AppPaths::new().settings_file;
    let mut config = AppConfig::load_from(&settings_file)
        .with_context(|| format!("failed to load {}", settings_file.display()))?;
    config.apply_env();
    log::info!(
        "Config: model={}, transcription_model={}, auth_required={}",
        config.llm.model,
        config.transcription.model,
        config.auth.required
    );

    // 4-5. Wire and serve
    robotalk::server::serve(config).await
}
