use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
///
/// Every value is read once, on first access, from the environment. `main` loads `.env`
/// with dotenvy before anything touches these statics.
///
/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Wildberries seller API key, sent verbatim in the `Authorization` header
/// Read from WB_API_KEY environment variable
pub static WB_API_KEY: Lazy<String> = Lazy::new(|| env::var("WB_API_KEY").unwrap_or_else(|_| String::new()));

/// Base URL of the Wildberries seller API
/// Read from WB_API_URL environment variable (tests point it at a mock server)
pub static WB_API_URL: Lazy<String> =
    Lazy::new(|| env::var("WB_API_URL").unwrap_or_else(|_| "https://suppliers-api.wildberries.ru".to_string()));

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: bot.db
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "bot.db".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Directory where sticker PNGs, per-supply PDF folders and zip archives are produced
/// Read from LABELS_DIR environment variable
/// Default: current directory
pub static LABELS_DIR: Lazy<String> = Lazy::new(|| env::var("LABELS_DIR").unwrap_or_else(|_| ".".to_string()));

/// TrueType font used for label text (must contain Cyrillic glyphs)
/// Read from FONT_PATH environment variable
/// Default: arial.ttf
pub static FONT_PATH: Lazy<String> = Lazy::new(|| env::var("FONT_PATH").unwrap_or_else(|_| "arial.ttf".to_string()));

/// Telegram chat id of the bot owner, registered as the only administrator at startup
/// Read from OWNER_ID environment variable
pub static OWNER_ID: Lazy<Option<i64>> = Lazy::new(|| env::var("OWNER_ID").ok().and_then(|v| v.trim().parse().ok()));

/// Display name stored for the owner
/// Read from OWNER_NAME environment variable
pub static OWNER_NAME: Lazy<String> = Lazy::new(|| env::var("OWNER_NAME").unwrap_or_else(|_| "Owner".to_string()));

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for a single HTTP request (in seconds)
    pub const TIMEOUT_SECS: u64 = 60;

    /// Network timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(TIMEOUT_SECS)
    }
}

/// Retry configuration for transient network failures
pub mod retry {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Delay added after every failed attempt (in seconds)
    pub const STEP_SECS: u64 = 5;

    /// Upper bound for the delay between attempts (in seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Maximum number of retries after the first attempt
    /// Read from WB_MAX_RETRIES environment variable
    pub static MAX_RETRIES: Lazy<u32> =
        Lazy::new(|| env::var("WB_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(10));

    pub fn step() -> Duration {
        Duration::from_secs(STEP_SECS)
    }

    pub fn max_delay() -> Duration {
        Duration::from_secs(MAX_DELAY_SECS)
    }
}

/// Supplies listing configuration
pub mod supplies {
    /// Page size used when walking the supplies list
    pub const PAGE_LIMIT: usize = 1000;

    /// Maximum number of supplies shown in one keyboard
    pub const MAX_LISTED: usize = 50;
}

/// Sticker request parameters and fixed label layout
pub mod label {
    /// Sticker image format requested from the vendor
    pub const STICKER_TYPE: &str = "png";

    /// Sticker width requested from the vendor (mm)
    pub const STICKER_WIDTH: u32 = 58;

    /// Sticker height requested from the vendor (mm)
    pub const STICKER_HEIGHT: u32 = 40;

    /// Physical label page size (mm)
    pub const PAGE_WIDTH_MM: f32 = 120.0;
    pub const PAGE_HEIGHT_MM: f32 = 75.0;

    /// Size the sticker image is scaled to on its page (mm)
    pub const IMAGE_WIDTH_MM: f32 = 95.0;
    pub const IMAGE_HEIGHT_MM: f32 = 65.0;

    pub const COUNTRY: &str = "Россия";
    pub const BRAND: &str = "CVT";

    /// Largest file a bot may upload through the public Bot API
    pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

    /// Name used when a product card carries no name characteristic
    pub const PLACEHOLDER_NAME: &str = "Наименование продукции";
}

/// Retry configuration for the dispatcher loop
pub mod dispatcher {
    use super::Duration;

    /// Maximum dispatcher restarts after a panic
    pub const MAX_RESTARTS: u32 = 5;

    /// Delay between dispatcher restarts (in seconds)
    pub const RESTART_DELAY_SECS: u64 = 5;

    pub fn restart_delay() -> Duration {
        Duration::from_secs(RESTART_DELAY_SECS)
    }
}
