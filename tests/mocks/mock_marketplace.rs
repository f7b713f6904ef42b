//! In-memory marketplace with call recording

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use wbstickers::api::Marketplace;
use wbstickers::core::{AppError, AppResult, Order, Product, Sticker, Supply, SupplyBarcode};

/// Fake vendor API.
///
/// Every known order gets `sticker_payload` as its sticker. Setting `fail_with` makes every
/// call fail with an API error.
#[derive(Default)]
pub struct MockMarketplace {
    pub supplies: Vec<Supply>,
    pub orders: HashMap<String, Vec<Order>>,
    pub new_orders: Vec<Order>,
    pub products: HashMap<String, Product>,
    pub sticker_payload: String,
    pub fail_with: Option<String>,
    pub product_calls: Mutex<Vec<String>>,
    pub sticker_calls: Mutex<Vec<Vec<i64>>>,
    pub delivered: Mutex<Vec<String>>,
}

impl MockMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, article: &str, name: &str, barcode: &str) -> Self {
        self.products.insert(
            article.to_string(),
            Product {
                article: article.to_string(),
                name: name.to_string(),
                barcode: barcode.to_string(),
            },
        );
        self
    }

    pub fn with_orders(mut self, supply_id: &str, orders: Vec<Order>) -> Self {
        self.orders.insert(supply_id.to_string(), orders);
        self
    }

    pub fn with_sticker_payload(mut self, payload: String) -> Self {
        self.sticker_payload = payload;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn product_calls(&self) -> Vec<String> {
        self.product_calls.lock().unwrap().clone()
    }

    pub fn sticker_calls(&self) -> Vec<Vec<i64>> {
        self.sticker_calls.lock().unwrap().clone()
    }

    fn check(&self) -> AppResult<()> {
        match &self.fail_with {
            Some(message) => Err(AppError::api(Some("503".to_string()), message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Marketplace for MockMarketplace {
    async fn fetch_supplies(&self, only_active: bool, limit: usize) -> AppResult<Vec<Supply>> {
        self.check()?;
        Ok(self
            .supplies
            .iter()
            .filter(|s| !only_active || !s.done)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_orders(&self, supply_id: &str) -> AppResult<Vec<Order>> {
        self.check()?;
        Ok(self.orders.get(supply_id).cloned().unwrap_or_default())
    }

    async fn fetch_new_orders(&self) -> AppResult<Vec<Order>> {
        self.check()?;
        Ok(self.new_orders.clone())
    }

    async fn fetch_product(&self, article: &str) -> AppResult<Product> {
        self.check()?;
        self.product_calls.lock().unwrap().push(article.to_string());
        Ok(self
            .products
            .get(article)
            .cloned()
            .unwrap_or_else(|| Product::placeholder(article)))
    }

    async fn fetch_stickers(&self, order_ids: &[i64]) -> AppResult<Vec<Sticker>> {
        self.check()?;
        self.sticker_calls.lock().unwrap().push(order_ids.to_vec());
        Ok(order_ids
            .iter()
            .map(|&order_id| Sticker {
                order_id,
                file: self.sticker_payload.clone(),
            })
            .collect())
    }

    async fn deliver_supply(&self, supply_id: &str) -> AppResult<u16> {
        self.check()?;
        self.delivered.lock().unwrap().push(supply_id.to_string());
        Ok(204)
    }

    async fn fetch_supply_barcode(&self, supply_id: &str) -> AppResult<SupplyBarcode> {
        self.check()?;
        Ok(SupplyBarcode {
            barcode: supply_id.to_string(),
            file: self.sticker_payload.clone(),
        })
    }
}
