//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console, RUST_LOG-aware)
//! - Startup configuration validation and logging

use anyhow::Result;

use crate::core::config;

/// Initialize the console logger.
///
/// Respects RUST_LOG if set, defaults to `info` otherwise.
pub fn init_logger() -> Result<()> {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
///
/// Validates and logs:
/// - BOT_TOKEN presence (without printing the token itself)
/// - Database path and whether the file already exists
/// - Rating thresholds in effect
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Startup Configuration Check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if config::BOT_TOKEN.is_empty() {
        log::error!("❌ BOT_TOKEN: not set — the bot cannot start without it");
        log::error!("   Create a .env file with BOT_TOKEN=<token from @BotFather>");
    } else {
        log::info!("✅ BOT_TOKEN: set ({} chars)", config::BOT_TOKEN.len());
    }

    let db_path = config::DATABASE_PATH.as_str();
    if std::path::Path::new(db_path).exists() {
        log::info!("✅ DATABASE_PATH: {} (exists)", db_path);
    } else {
        log::info!("ℹ️  DATABASE_PATH: {} (will be created)", db_path);
    }

    log::info!(
        "   Rating thresholds: create >= {}, view >= {}, default {}",
        *config::rating::MIN_RATING_TO_CREATE,
        *config::rating::MIN_RATING_TO_VIEW,
        config::rating::DEFAULT_RATING
    );
    log::info!(
        "   VIP: {} tokens for {} days",
        config::vip::COST_TOKENS,
        config::vip::DURATION_DAYS
    );
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
