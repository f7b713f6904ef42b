//! Registration gate
//!
//! Only registered (and active) chats reach the bot's features. Anyone else gets their
//! request forwarded to the administrator, who approves or denies it with a button.

use std::sync::Arc;

use teloxide::prelude::*;

use super::types::{HandlerDeps, HandlerError, UserInfo};
use crate::storage::db::{self, DbPool};
use crate::storage::get_connection;
use crate::telegram::notifications::notify_admin_registration_request;
use crate::telegram::Bot;

/// True when the chat belongs to a registered user. Database failures count as "not registered".
pub fn is_registered(db_pool: &Arc<DbPool>, chat_id: ChatId) -> bool {
    let conn = match get_connection(db_pool) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get DB connection for registration check: {}", e);
            return false;
        }
    };
    match db::is_registered(&conn, chat_id.0) {
        Ok(registered) => registered,
        Err(e) => {
            log::error!("Registration check failed for {}: {}", chat_id, e);
            false
        }
    }
}

/// Answers a message from an unregistered chat.
pub async fn handle_unregistered_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user = UserInfo::from_message(msg);

    if deps.registration_requests.contains_key(&user.chat_id) {
        bot.send_message(msg.chat.id, "Ваш запрос на регистрацию уже отправлен администратору")
            .await?;
        return Ok(());
    }

    log::info!("Registration request from {} ({})", user.full_name, user.chat_id);
    if notify_admin_registration_request(bot, &deps.db_pool, user.chat_id, &user.full_name).await {
        deps.registration_requests.insert(user.chat_id, user.full_name);
        bot.send_message(
            msg.chat.id,
            "Вы не зарегистрированы. Запрос на регистрацию отправлен администратору",
        )
        .await?;
    } else {
        bot.send_message(msg.chat.id, "Регистрация сейчас недоступна. Попробуйте позже")
            .await?;
    }
    Ok(())
}

/// Registers a user on the administrator's approval.
pub async fn approve_registration(
    bot: &Bot,
    deps: &HandlerDeps,
    admin_chat: ChatId,
    user_id: i64,
) -> Result<(), HandlerError> {
    let full_name = deps
        .registration_requests
        .remove(&user_id)
        .map(|(_, name)| name)
        .unwrap_or_else(|| user_id.to_string());

    {
        let conn = get_connection(&deps.db_pool)?;
        db::create_user(&conn, user_id, &full_name)?;
    }
    log::info!("User {} ({}) registered", full_name, user_id);

    bot.send_message(admin_chat, format!("Пользователь {} зарегистрирован", full_name))
        .await?;
    bot.send_message(ChatId(user_id), "Администратор подтвердил регистрацию. Нажмите /start")
        .await?;
    Ok(())
}

/// Rejects a registration request.
pub async fn deny_registration(
    bot: &Bot,
    deps: &HandlerDeps,
    admin_chat: ChatId,
    user_id: i64,
) -> Result<(), HandlerError> {
    let full_name = deps
        .registration_requests
        .remove(&user_id)
        .map(|(_, name)| name)
        .unwrap_or_else(|| user_id.to_string());

    {
        let conn = get_connection(&deps.db_pool)?;
        db::deactivate_user(&conn, user_id, &full_name)?;
    }
    log::info!("Registration of {} ({}) denied", full_name, user_id);

    bot.send_message(admin_chat, format!("Запрос пользователя {} отклонён", full_name))
        .await?;
    bot.send_message(ChatId(user_id), "Администратор отклонил запрос на регистрацию")
        .await?;
    Ok(())
}

/// True when the chat is the administrator's.
pub fn is_admin(db_pool: &Arc<DbPool>, chat_id: ChatId) -> bool {
    get_connection(db_pool)
        .ok()
        .and_then(|conn| db::get_admin_id(&conn).ok().flatten())
        == Some(chat_id.0)
}
