//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! The handlers are organized in a testable way, allowing integration tests
//! to use the same handler tree as production code.

mod callback_router;
mod commands;
pub mod guard;
mod replies;
mod schema;
pub mod supplies;
mod types;

pub use replies::SERVER_UNAVAILABLE;
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError, PendingInput, UserInfo};
