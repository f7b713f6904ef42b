use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::callbacks::CallbackAction;
use crate::core::types::Supply;

fn button(text: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.to_string())
}

/// Keyboard shown on /start
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("Показать поставки", CallbackAction::ShowSupplies)],
        vec![button("Показать больше поставок", CallbackAction::MoreSupplies)],
    ])
}

/// Text of a supply button: `"{name} | {id} | {state}"`
pub fn supply_button_text(supply: &Supply) -> String {
    format!("{} | {} | {}", supply.name, supply.id, supply.status_label())
}

/// One button per supply
pub fn supplies_keyboard(supplies: &[Supply]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        supplies
            .iter()
            .map(|supply| vec![button(supply_button_text(supply), CallbackAction::Supply(supply.id.clone()))])
            .collect::<Vec<_>>(),
    )
}

/// Actions under an order summary
pub fn supply_actions(supply_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("Создать стикеры", CallbackAction::Stickers(supply_id.to_string()))],
        vec![button("Отправить в доставку", CallbackAction::Deliver(supply_id.to_string()))],
    ])
}

/// Approve/deny buttons sent to the admin
pub fn registration_request(user_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("Зарегистрировать", CallbackAction::Register(user_id)),
        button("Отклонить", CallbackAction::Deny(user_id)),
    ]])
}
