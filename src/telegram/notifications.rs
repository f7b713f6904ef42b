//! Messages to the administrator

use std::sync::Arc;

use teloxide::prelude::*;

use super::keyboards;
use crate::storage::db::{self, DbPool};
use crate::storage::get_connection;
use crate::telegram::Bot;

fn admin_chat_id(db_pool: &Arc<DbPool>) -> Option<ChatId> {
    let conn = match get_connection(db_pool) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get DB connection for admin notification: {}", e);
            return None;
        }
    };
    match db::get_admin_id(&conn) {
        Ok(Some(id)) => Some(ChatId(id)),
        Ok(None) => {
            log::warn!("No administrator registered, notification dropped");
            None
        }
        Err(e) => {
            log::error!("Failed to look up administrator: {}", e);
            None
        }
    }
}

/// Sends plain text to the administrator. Failures are logged, never returned.
pub async fn notify_admin_text(bot: &Bot, db_pool: &Arc<DbPool>, text: &str) {
    let Some(chat_id) = admin_chat_id(db_pool) else {
        return;
    };
    if let Err(e) = bot.send_message(chat_id, text).await {
        log::error!("Failed to notify administrator: {}", e);
    }
}

/// Forwards a registration request with approve/deny buttons.
///
/// Returns false when no administrator could be reached.
pub async fn notify_admin_registration_request(
    bot: &Bot,
    db_pool: &Arc<DbPool>,
    user_id: i64,
    full_name: &str,
) -> bool {
    let Some(chat_id) = admin_chat_id(db_pool) else {
        return false;
    };

    let text = format!("Запрос на регистрацию\nИмя: {}\nID: {}", full_name, user_id);
    match bot
        .send_message(chat_id, text)
        .reply_markup(keyboards::registration_request(user_id))
        .await
    {
        Ok(_) => true,
        Err(e) => {
            log::error!("Failed to send registration request of {}: {}", user_id, e);
            false
        }
    }
}
