//! Command handler implementations (/start, /neworders, /help)

use teloxide::prelude::*;
use teloxide::types::Message;
use teloxide::utils::command::BotCommands;

use super::replies::report_failure;
use super::types::{HandlerDeps, HandlerError};
use crate::core::utils::join_orders;
use crate::telegram::bot::Command;
use crate::telegram::keyboards;
use crate::telegram::Bot;

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    // /start abandons any unanswered question
    deps.pending.remove(&msg.chat.id);

    bot.send_message(msg.chat.id, "Выберите действие")
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

/// Handle /neworders command
pub(super) async fn handle_new_orders_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let orders = match deps.api.fetch_new_orders().await {
        Ok(orders) => orders,
        Err(e) => return report_failure(bot, deps, msg.chat.id, "new orders", &e).await,
    };

    let text = if orders.is_empty() {
        "Новых заказов нет".to_string()
    } else {
        format!("Новые заказы ({}):\n{}", orders.len(), join_orders(&orders))
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /help command
pub(super) async fn handle_help_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}
