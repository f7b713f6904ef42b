use teloxide::prelude::*;

use super::guard;
use super::supplies;
use super::types::{HandlerDeps, HandlerError};
use crate::core::config;
use crate::telegram::callbacks::CallbackAction;
use crate::telegram::Bot;

/// Handles inline button presses.
///
/// The query is answered right away: building a label archive takes longer than Telegram
/// waits for an answer.
pub(super) async fn handle_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        return Ok(());
    };
    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        log::warn!("Unknown callback data {:?} from chat {}", q.data, chat_id);
        return Ok(());
    };
    log::info!("Callback {} from chat {}", action, chat_id);

    match action {
        CallbackAction::ShowSupplies => {
            supplies::list_supplies(&bot, chat_id, &deps, true, config::supplies::MAX_LISTED).await
        }
        CallbackAction::MoreSupplies => supplies::ask_supply_count(&bot, chat_id, &deps).await,
        CallbackAction::Supply(id) => supplies::show_supply_orders(&bot, chat_id, &deps, &id).await,
        CallbackAction::Stickers(id) => supplies::send_supply_labels(&bot, chat_id, &deps, &id).await,
        CallbackAction::Deliver(id) => supplies::deliver_supply(&bot, chat_id, &deps, &id).await,
        CallbackAction::Register(user_id) | CallbackAction::Deny(user_id) if !guard::is_admin(&deps.db_pool, chat_id) => {
            log::warn!("Chat {} tried to decide on registration of {}", chat_id, user_id);
            Ok(())
        }
        CallbackAction::Register(user_id) => guard::approve_registration(&bot, &deps, chat_id, user_id).await,
        CallbackAction::Deny(user_id) => guard::deny_registration(&bot, &deps, chat_id, user_id).await,
    }
}
