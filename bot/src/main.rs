//! Kursbot Binary
//!
//! Telegram frontend for the currency conversion engine.

use std::sync::Arc;

use teloxide::Bot;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kursbot_bot::{handlers, BotConfig};
use kursbot_common::SourceKind;
use kursbot_rates::{ConversionEngine, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Kursbot");

    // Load configuration
    let config = BotConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let engine_config = EngineConfig::from_env();
    if let Err(e) = engine_config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    // Create conversion engine
    let engine = Arc::new(ConversionEngine::with_http_feed(engine_config)?);

    info!(
        fiat = engine.supported_codes(SourceKind::Fiat).len(),
        crypto = engine.supported_codes(SourceKind::Crypto).len(),
        "Conversion engine ready"
    );

    // Run long polling until Ctrl+C
    let bot = Bot::new(&config.token);
    handlers::dispatch(bot, engine).await;

    info!("Kursbot shutdown complete");
    Ok(())
}
