use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};

use crate::core::types::Order;

/// Name used when sanitizing leaves nothing behind
const FALLBACK_FILE_NAME: &str = "article";

/// Makes a string safe to use as a single path segment.
///
/// Characters illegal on common filesystems are stripped, surrounding whitespace is
/// trimmed, and an empty result becomes `article`.
pub fn sanitize_file_name(raw: &str) -> String {
    let sanitized = sanitize_filename::sanitize(raw.trim());
    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        sanitized.to_string()
    }
}

/// Hands out sanitized file names, disambiguating collisions.
///
/// Two distinct raw strings that sanitize to the same name would overwrite each other's
/// files. The first one to claim a name keeps it; later ones get `-<8 hex of sha256(raw)>`.
/// The same raw string always maps to the same name.
#[derive(Debug, Default)]
pub struct FileNamer {
    assigned: HashMap<String, String>,
    owners: HashMap<String, String>,
}

impl FileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namer where every raw string that is already a clean file name owns that name,
    /// whatever order the others are asked for in.
    pub fn reserving<'a>(raws: impl IntoIterator<Item = &'a str>) -> Self {
        let mut namer = Self::new();
        for raw in raws {
            if sanitize_file_name(raw) == raw {
                namer.name_for(raw);
            }
        }
        namer
    }

    pub fn name_for(&mut self, raw: &str) -> String {
        if let Some(name) = self.assigned.get(raw) {
            return name.clone();
        }

        let base = sanitize_file_name(raw);
        let name = match self.owners.get(&base) {
            Some(owner) if owner != raw => format!("{}-{}", base, short_hash(raw)),
            _ => base,
        };

        self.owners.insert(name.clone(), raw.to_string());
        self.assigned.insert(raw.to_string(), name.clone());
        name
    }
}

fn short_hash(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(&digest[..4])
}

/// Collapses orders into `"{article} - {count}шт."` lines sorted by article.
pub fn join_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "В данной поставке нет заказов".to_string();
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for order in orders {
        *counts.entry(order.article.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(article, count)| format!("{} - {}шт.", article, count))
        .collect::<Vec<_>>()
        .join("\n")
}
