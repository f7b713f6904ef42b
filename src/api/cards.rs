//! Product card parsing
//!
//! A card from `/content/v1/cards/filter` looks like:
//!
//! ```json
//! {"vendorCode": "A1",
//!  "characteristics": [{"Предмет": "Футболки"}, {"Наименование": "Футболка"}],
//!  "sizes": [{"skus": ["2000000000011"]}]}
//! ```

use serde_json::Value;

use crate::core::config;
use crate::core::types::Product;

const NAME_CHARACTERISTIC: &str = "Наименование";

/// Finds the card for `article` in a cards/filter response body and turns it into a product.
///
/// No matching card yields an empty product so that the article fails at render time
/// instead of aborting the run.
pub fn product_from_cards(body: &Value, article: &str) -> Product {
    let card = body
        .get("data")
        .and_then(Value::as_array)
        .and_then(|cards| {
            cards
                .iter()
                .find(|card| card.get("vendorCode").and_then(Value::as_str) == Some(article))
        });

    match card {
        Some(card) => parse_card(card, article),
        None => {
            log::warn!("No product card found for article {}", article);
            Product::placeholder(article)
        }
    }
}

fn parse_card(card: &Value, article: &str) -> Product {
    let name = card
        .get("characteristics")
        .and_then(Value::as_array)
        .and_then(|chars| {
            chars.iter().find_map(|c| {
                c.get(NAME_CHARACTERISTIC)
                    .and_then(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
            })
        })
        .unwrap_or(config::label::PLACEHOLDER_NAME)
        .to_string();

    let barcode = card
        .get("sizes")
        .and_then(|sizes| sizes.get(0))
        .and_then(|size| size.get("skus"))
        .and_then(|skus| skus.get(0))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Product {
        article: article.to_string(),
        name,
        barcode,
    }
}
