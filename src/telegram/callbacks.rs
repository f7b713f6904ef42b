//! Inline button payloads
//!
//! Telegram limits callback data to 64 bytes, supply ids and chat ids fit comfortably.

use std::fmt;

const SHOW_SUPPLIES: &str = "show_supplies";
const MORE_SUPPLIES: &str = "more_supplies";
const SUPPLY: &str = "supply_";
const STICKERS: &str = "stickers_for_supply_";
const DELIVER: &str = "deliver_";
const REGISTER: &str = "register_";
const DENY: &str = "deny_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// List active supplies
    ShowSupplies,
    /// Ask how many recent supplies to list
    MoreSupplies,
    /// Order summary of a supply
    Supply(String),
    /// Build and send the label archive of a supply
    Stickers(String),
    /// Hand a supply over to delivery
    Deliver(String),
    /// Admin approves a registration request
    Register(i64),
    /// Admin rejects a registration request
    Deny(i64),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            SHOW_SUPPLIES => return Some(Self::ShowSupplies),
            MORE_SUPPLIES => return Some(Self::MoreSupplies),
            _ => {}
        }

        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        if let Some(id) = data.strip_prefix(STICKERS) {
            non_empty(id).map(Self::Stickers)
        } else if let Some(id) = data.strip_prefix(SUPPLY) {
            non_empty(id).map(Self::Supply)
        } else if let Some(id) = data.strip_prefix(DELIVER) {
            non_empty(id).map(Self::Deliver)
        } else if let Some(id) = data.strip_prefix(REGISTER) {
            id.parse().ok().map(Self::Register)
        } else if let Some(id) = data.strip_prefix(DENY) {
            id.parse().ok().map(Self::Deny)
        } else {
            None
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowSupplies => f.write_str(SHOW_SUPPLIES),
            Self::MoreSupplies => f.write_str(MORE_SUPPLIES),
            Self::Supply(id) => write!(f, "{}{}", SUPPLY, id),
            Self::Stickers(id) => write!(f, "{}{}", STICKERS, id),
            Self::Deliver(id) => write!(f, "{}{}", DELIVER, id),
            Self::Register(id) => write!(f, "{}{}", REGISTER, id),
            Self::Deny(id) => write!(f, "{}{}", DENY, id),
        }
    }
}
