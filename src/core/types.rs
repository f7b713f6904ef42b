//! Domain records shared by the API client, the cache and the label pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shipment batch grouping orders for joint dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supply {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    pub done: bool,
}

impl Supply {
    /// Human readable state used on buttons
    pub fn status_label(&self) -> &'static str {
        if self.done {
            "Закрыта"
        } else {
            "Открыта"
        }
    }
}

/// A single customer purchase tied to one product article.
///
/// `supply_id` and `sticker` are local cache fields: the vendor's order payload
/// carries neither, so they default when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub article: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub supply_id: Option<String>,
    /// Base64 encoded PNG sticker
    #[serde(default, skip_serializing)]
    pub sticker: Option<String>,
}

impl Order {
    /// File name the order's sticker is materialized under (`<id>.png`)
    pub fn sticker_file_name(&self) -> String {
        format!("{}.png", self.id)
    }
}

/// Product metadata keyed by article.
///
/// Empty `name`/`barcode` mean "not enriched yet" (or the vendor had no data).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Product {
    pub article: String,
    pub name: String,
    pub barcode: String,
}

impl Product {
    /// Placeholder row created when an order references an unseen article
    pub fn placeholder(article: impl Into<String>) -> Self {
        Self {
            article: article.into(),
            ..Self::default()
        }
    }

    pub fn is_enriched(&self) -> bool {
        !self.name.trim().is_empty() && !self.barcode.trim().is_empty()
    }
}

/// Vendor-issued per-order label image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    pub order_id: i64,
    /// Base64 encoded PNG
    pub file: String,
}

/// QR sticker of a supply that was handed over to delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyBarcode {
    pub barcode: String,
    /// Base64 encoded PNG
    pub file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_deserializes_from_vendor_payload() {
        let json = r#"{"id": 101, "article": "A1", "createdAt": "2023-02-01T10:00:00Z", "skus": ["1"], "price": 100}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, 101);
        assert_eq!(order.article, "A1");
        assert_eq!(order.supply_id, None);
        assert_eq!(order.sticker, None);
        assert_eq!(order.sticker_file_name(), "101.png");
    }

    #[test]
    fn test_supply_deserializes_without_closed_at() {
        let json = r#"{"id": "WB-GI-1", "name": "Поставка", "createdAt": "2023-02-01T10:00:00Z", "done": false}"#;
        let supply: Supply = serde_json::from_str(json).unwrap();
        assert_eq!(supply.closed_at, None);
        assert_eq!(supply.status_label(), "Открыта");
    }

    #[test]
    fn test_product_enrichment_state() {
        assert!(!Product::placeholder("A1").is_enriched());
        let product = Product {
            article: "A1".into(),
            name: "Widget".into(),
            barcode: "   ".into(),
        };
        assert!(!product.is_enriched());
    }
}
