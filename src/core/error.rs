use thiserror::Error;

/// Centralized error types for the application
///
/// Everything that can abort a bot action or a label run is converted to this enum.
/// Per-article rendering failures are NOT here: they are reported, not propagated
/// (see [`crate::labels::LabelError`]).
///
/// # Example
///
/// ```no_run
/// use wbstickers::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(String),

    /// Transport-level HTTP errors, including non-success status codes
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor API accepted the request but rejected it
    #[error("Wildberries API error{}: {message}", code.as_ref().map(|c| format!(" {}", c)).unwrap_or_default())]
    Api { code: Option<String>, message: String },

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Stored sticker payload is not valid base64
    #[error("Sticker of order {order_id} is not valid base64: {source}")]
    StickerDecode {
        order_id: i64,
        #[source]
        source: base64::DecodeError,
    },

    /// Order reached rendering without a sticker payload
    #[error("Order {0} has no sticker")]
    MissingSticker(i64),

    /// PDF assembly errors outside of a single article
    #[error("PDF error: {0}")]
    Pdf(String),

    /// A blocking task died before returning
    #[error("Background task failed: {0}")]
    Task(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Builds a vendor-level error from the API's `code`/`message` pair.
    pub fn api(code: Option<String>, message: impl Into<String>) -> Self {
        AppError::Api {
            code,
            message: message.into(),
        }
    }

    /// True for errors that come from talking to the vendor (shown as "try again later").
    pub fn is_vendor_failure(&self) -> bool {
        matches!(self, AppError::Http(_) | AppError::Api { .. })
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
