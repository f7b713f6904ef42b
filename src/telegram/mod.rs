//! Telegram bot integration and handlers

pub mod bot;
pub mod callbacks;
pub mod handlers;
pub mod keyboards;
pub mod notifications;

/// Bot type used across handlers
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use callbacks::CallbackAction;
pub use handlers::{schema, HandlerDeps, HandlerError};
