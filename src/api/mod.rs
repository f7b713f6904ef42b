//! Wildberries seller API
//!
//! - [`Marketplace`]: the seam the bot and the label pipeline talk to
//! - [`WbClient`]: the reqwest implementation with retry on network errors
//! - [`cards`]: product card parsing

pub mod cards;
pub mod client;

use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::core::types::{Order, Product, Sticker, Supply, SupplyBarcode};

pub use client::WbClient;

/// Operations the bot needs from the marketplace.
///
/// Every method raises `AppError::Http` on transport/status failures and
/// `AppError::Api` when the vendor rejects the request.
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Most recent supplies, newest first. `only_active` skips closed ones.
    async fn fetch_supplies(&self, only_active: bool, limit: usize) -> AppResult<Vec<Supply>>;

    /// Orders assigned to a supply.
    async fn fetch_orders(&self, supply_id: &str) -> AppResult<Vec<Order>>;

    /// Orders not yet assigned to any supply.
    async fn fetch_new_orders(&self) -> AppResult<Vec<Order>>;

    /// Product name and barcode for an article.
    ///
    /// An article the vendor has no card for comes back with empty name and barcode.
    async fn fetch_product(&self, article: &str) -> AppResult<Product>;

    /// PNG stickers for a batch of orders, one request for the whole batch.
    async fn fetch_stickers(&self, order_ids: &[i64]) -> AppResult<Vec<Sticker>>;

    /// Hands a supply over to delivery. Returns the HTTP status code.
    async fn deliver_supply(&self, supply_id: &str) -> AppResult<u16>;

    /// QR sticker of a supply already in delivery.
    async fn fetch_supply_barcode(&self, supply_id: &str) -> AppResult<SupplyBarcode>;
}
