//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::callback_router::handle_callback;
use super::commands::{handle_help_command, handle_new_orders_command, handle_start_command};
use super::guard::{handle_unregistered_message, is_registered};
use super::supplies::handle_supply_count_reply;
use super::types::{HandlerDeps, HandlerError, PendingInput};
use crate::telegram::bot::Command;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The registration gate comes first: nothing below it sees updates from unregistered chats.
/// The same schema is used in production and can be used in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(unregistered_message_handler(deps.clone()))
        .branch(unregistered_callback_handler(deps.clone()))
        .branch(command_handler(deps.clone()))
        .branch(pending_input_handler(deps.clone()))
        .branch(fallback_message_handler())
        .branch(callback_handler(deps))
}

/// Messages from chats that are not registered
fn unregistered_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let gate = deps.clone();
    Update::filter_message()
        .filter(move |msg: Message| !is_registered(&gate.db_pool, msg.chat.id))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_unregistered_message(&bot, &msg, &deps).await }
        })
}

/// Button presses from chats that are not registered
fn unregistered_callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query()
        .filter(move |q: CallbackQuery| {
            q.message
                .as_ref()
                .map(|m| !is_registered(&deps.db_pool, m.chat().id))
                .unwrap_or(true)
        })
        .endpoint(|bot: Bot, q: CallbackQuery| async move { answer_unregistered(&bot, &q).await })
}

async fn answer_unregistered(bot: &Bot, q: &CallbackQuery) -> Result<(), HandlerError> {
    bot.answer_callback_query(q.id.clone())
        .text("Вы не зарегистрированы")
        .await?;
    Ok(())
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await,
                    Command::NewOrders => handle_new_orders_command(&bot, &msg, &deps).await,
                    Command::Help => handle_help_command(&bot, &msg).await,
                }
            }
        },
    ))
}

/// Text answering a question the bot asked
fn pending_input_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let gate = deps.clone();
    Update::filter_message()
        .filter(move |msg: Message| gate.pending.get(&msg.chat.id).map(|p| *p) == Some(PendingInput::SupplyCount))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_supply_count_reply(&bot, &msg, &deps).await }
        })
}

/// Any other message from a registered chat
fn fallback_message_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(|bot: Bot, msg: Message| async move { point_to_start(&bot, &msg).await })
}

async fn point_to_start(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, "Нажмите /start, чтобы открыть меню")
        .await?;
    Ok(())
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move { handle_callback(bot, q, deps).await }
    })
}
