use teloxide::prelude::*;

use super::types::{HandlerDeps, HandlerError};
use crate::core::error::AppError;
use crate::telegram::notifications::notify_admin_text;
use crate::telegram::Bot;

/// Text shown to users when the vendor API cannot be reached
pub const SERVER_UNAVAILABLE: &str = "Сервер недоступен. Попробуйте позже";

/// Tells the user an action failed and forwards the details to the administrator.
pub(super) async fn report_failure(
    bot: &Bot,
    deps: &HandlerDeps,
    chat_id: ChatId,
    action: &str,
    err: &AppError,
) -> Result<(), HandlerError> {
    log::error!("{} failed for chat {}: {}", action, chat_id, err);

    let user_text = if err.is_vendor_failure() {
        SERVER_UNAVAILABLE.to_string()
    } else {
        "Не удалось выполнить действие. Администратор уже уведомлён".to_string()
    };
    bot.send_message(chat_id, user_text).await?;

    notify_admin_text(
        bot,
        &deps.db_pool,
        &format!("Ошибка ({})\nchat_id: {}\n{}", action, chat_id, err),
    )
    .await;
    Ok(())
}
