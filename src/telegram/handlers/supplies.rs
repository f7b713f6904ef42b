//! Supply flows: listing, order summary, label archive, delivery

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use teloxide::prelude::*;
use teloxide::types::InputFile;

use super::replies::report_failure;
use super::types::{HandlerDeps, HandlerError, PendingInput};
use crate::core::config;
use crate::core::error::AppError;
use crate::core::utils::join_orders;
use crate::labels::{archive_within_limit, prepare_labels, ArtifactsGuard};
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::keyboards;
use crate::telegram::Bot;

/// Lists up to `limit` most recent supplies.
pub(super) async fn list_supplies(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    only_active: bool,
    limit: usize,
) -> Result<(), HandlerError> {
    let supplies = match deps.api.fetch_supplies(only_active, limit).await {
        Ok(supplies) => supplies,
        Err(e) => return report_failure(bot, deps, chat_id, "supplies", &e).await,
    };

    {
        let conn = get_connection(&deps.db_pool)?;
        db::upsert_supplies(&conn, &supplies)?;
    }

    if supplies.is_empty() {
        let text = if only_active { "Нет открытых поставок" } else { "Поставок нет" };
        bot.send_message(chat_id, text).await?;
        return Ok(());
    }

    bot.send_message(chat_id, "Выберите поставку")
        .reply_markup(keyboards::supplies_keyboard(&supplies))
        .await?;
    Ok(())
}

/// Asks how many recent supplies to show; the answer goes to [`handle_supply_count_reply`].
pub(super) async fn ask_supply_count(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> Result<(), HandlerError> {
    deps.pending.insert(chat_id, PendingInput::SupplyCount);
    bot.send_message(
        chat_id,
        format!(
            "Сколько последних поставок показать? Введите число от 1 до {}",
            config::supplies::MAX_LISTED
        ),
    )
    .await?;
    Ok(())
}

/// Parses a requested supply count, accepting `1..=MAX_LISTED`.
pub fn parse_supply_count(text: &str) -> Option<usize> {
    text.trim()
        .parse::<usize>()
        .ok()
        .filter(|count| (1..=config::supplies::MAX_LISTED).contains(count))
}

pub(super) async fn handle_supply_count_reply(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(count) = msg.text().and_then(parse_supply_count) else {
        // Stay in the pending state until a valid number arrives
        bot.send_message(
            msg.chat.id,
            format!("Нужно число от 1 до {}. Попробуйте ещё раз", config::supplies::MAX_LISTED),
        )
        .await?;
        return Ok(());
    };

    deps.pending.remove(&msg.chat.id);
    list_supplies(bot, msg.chat.id, deps, false, count).await
}

/// Fetches and caches the orders of a supply, then shows their summary.
pub(super) async fn show_supply_orders(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    supply_id: &str,
) -> Result<(), HandlerError> {
    let orders = match deps.api.fetch_orders(supply_id).await {
        Ok(orders) => orders,
        Err(e) => return report_failure(bot, deps, chat_id, "supply orders", &e).await,
    };

    {
        let conn = get_connection(&deps.db_pool)?;
        db::upsert_orders(&conn, Some(supply_id), &orders)?;
    }
    log::info!("Supply {}: {} orders cached", supply_id, orders.len());

    bot.send_message(chat_id, format!("Поставка {}\n\n{}", supply_id, join_orders(&orders)))
        .reply_markup(keyboards::supply_actions(supply_id))
        .await?;
    Ok(())
}

/// Builds the label archive of a supply and sends it.
///
/// Runs are serialized; artifacts are removed afterwards whatever happened.
pub(super) async fn send_supply_labels(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    supply_id: &str,
) -> Result<(), HandlerError> {
    let _run = deps.label_lock.lock().await;
    bot.send_message(chat_id, "Создаю стикеры, это может занять некоторое время...")
        .await?;

    let guard = ArtifactsGuard::new(&deps.workspace);
    let prepared = match prepare_labels(&deps.db_pool, deps.api.as_ref(), &deps.workspace, supply_id).await {
        Ok(prepared) => prepared,
        Err(e) => return report_failure(bot, deps, chat_id, "labels", &e).await,
    };

    if prepared.report.successfully.is_empty() && prepared.report.failed.is_empty() {
        bot.send_message(chat_id, "В данной поставке нет заказов").await?;
    } else if !archive_within_limit(&prepared.archive_path, config::label::MAX_UPLOAD_BYTES)? {
        log::warn!("Label archive of supply {} exceeds the upload limit", supply_id);
        bot.send_message(
            chat_id,
            "Архив со стикерами больше 50 МБ и не может быть отправлен. Используйте шрифт меньшего размера",
        )
        .await?;
    } else {
        bot.send_document(chat_id, InputFile::file(prepared.archive_path.clone()))
            .caption(format!("Стикеры для поставки {}", supply_id))
            .await?;
    }
    if let Some(text) = prepared.report.failure_message() {
        bot.send_message(chat_id, text).await?;
    }

    guard.finish()?;
    Ok(())
}

/// Hands a supply over to delivery and sends back its QR sticker.
pub(super) async fn deliver_supply(
    bot: &Bot,
    chat_id: ChatId,
    deps: &HandlerDeps,
    supply_id: &str,
) -> Result<(), HandlerError> {
    let result: Result<_, AppError> = async {
        let status = deps.api.deliver_supply(supply_id).await?;
        let barcode = deps.api.fetch_supply_barcode(supply_id).await?;
        Ok((status, barcode))
    }
    .await;

    let (status, barcode) = match result {
        Ok(delivered) => delivered,
        Err(e) => return report_failure(bot, deps, chat_id, "deliver", &e).await,
    };
    log::info!("Supply {} sent to delivery (status {})", supply_id, status);

    let caption = format!("Поставка {} передана в доставку", supply_id);
    match STANDARD.decode(&barcode.file) {
        Ok(png) => {
            bot.send_photo(chat_id, InputFile::memory(png).file_name(format!("{}.png", supply_id)))
                .caption(caption)
                .await?;
        }
        Err(e) => {
            log::warn!("QR sticker of supply {} is not valid base64: {}", supply_id, e);
            bot.send_message(chat_id, format!("{}\nШтрихкод: {}", caption, barcode.barcode))
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supply_count() {
        assert_eq!(parse_supply_count(" 7 "), Some(7));
        assert_eq!(parse_supply_count("50"), Some(50));
        assert_eq!(parse_supply_count("51"), None);
        assert_eq!(parse_supply_count("0"), None);
        assert_eq!(parse_supply_count("пять"), None);
    }
}
