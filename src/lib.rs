//! wbstickers - Telegram bot for Wildberries sellers
//!
//! Lists supplies and their orders, hands supplies over to delivery, and builds per-article
//! shipping label PDFs packed into one zip archive per supply.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, retry and shared types
//! - `api`: Wildberries seller API client
//! - `storage`: SQLite cache of users, supplies, orders and products
//! - `labels`: the label pipeline
//! - `telegram`: Telegram bot integration and handlers
//! - `cli`: command line interface

pub mod api;
pub mod cli;
pub mod core;
pub mod labels;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use api::{Marketplace, WbClient};
pub use core::{config, AppError, AppResult};
pub use labels::{cleanup_temp_artifacts, prepare_labels, LabelWorkspace, PreparedLabels, StickerReport};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
