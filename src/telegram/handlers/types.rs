//! Handler types and dependencies

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::types::{ChatId, Message, User};
use tokio::sync::Mutex;

use crate::api::Marketplace;
use crate::labels::LabelWorkspace;
use crate::storage::db::DbPool;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Free-text reply a chat owes the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    /// How many recent supplies to list
    SupplyCount,
}

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub api: Arc<dyn Marketplace>,
    pub workspace: Arc<LabelWorkspace>,
    /// Chats whose next text message answers a question
    pub pending: Arc<DashMap<ChatId, PendingInput>>,
    /// Names of users waiting for registration approval
    pub registration_requests: Arc<DashMap<i64, String>>,
    /// Label runs share the workspace, one at a time
    pub label_lock: Arc<Mutex<()>>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, api: Arc<dyn Marketplace>, workspace: Arc<LabelWorkspace>) -> Self {
        Self {
            db_pool,
            api,
            workspace,
            pending: Arc::new(DashMap::new()),
            registration_requests: Arc::new(DashMap::new()),
            label_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// User info for registration requests
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub chat_id: i64,
    pub full_name: String,
}

impl UserInfo {
    fn from_user(chat_id: ChatId, user: Option<&User>) -> Self {
        Self {
            chat_id: chat_id.0,
            full_name: user.map(User::full_name).unwrap_or_else(|| chat_id.0.to_string()),
        }
    }

    /// Extract user info from a Telegram message
    pub fn from_message(msg: &Message) -> Self {
        Self::from_user(msg.chat.id, msg.from.as_ref())
    }
}
