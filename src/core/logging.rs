//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A configuration summary logged once at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;
use std::path::Path;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
///
/// Secrets are never printed, only whether they are set.
pub fn log_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if config::WB_API_KEY.is_empty() {
        log::error!("❌ WB_API_KEY: not set, every Wildberries request will be rejected");
    } else {
        log::info!("✅ WB_API_KEY: set");
    }
    log::info!("   WB_API_URL: {}", config::WB_API_URL.as_str());
    log::info!("   DATABASE_PATH: {}", config::DATABASE_PATH.as_str());
    log::info!("   LABELS_DIR: {}", config::LABELS_DIR.as_str());

    let font = config::FONT_PATH.as_str();
    if Path::new(font).exists() {
        log::info!("✅ FONT_PATH: {}", font);
    } else {
        log::warn!("⚠️  FONT_PATH: {} (not found, labels fall back to Helvetica without Cyrillic)", font);
    }

    match *config::OWNER_ID {
        Some(id) => log::info!("✅ OWNER_ID: {}", id),
        None => log::warn!("⚠️  OWNER_ID: not set, registration requests have nowhere to go"),
    }
}
