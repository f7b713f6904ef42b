//! reqwest client for the Wildberries seller API

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::cards::product_from_cards;
use super::Marketplace;
use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::retry::{retry, RetryConfig};
use crate::core::types::{Order, Product, Sticker, Supply, SupplyBarcode};

/// Authenticated client for the seller API.
#[derive(Debug, Clone)]
pub struct WbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl WbClient {
    /// Creates a client for `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(config::network::timeout()).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry: RetryConfig::default(),
        })
    }

    /// Client configured from `WB_API_URL` / `WB_API_KEY`.
    pub fn from_env() -> AppResult<Self> {
        Self::new(config::WB_API_URL.as_str(), config::WB_API_KEY.as_str())
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request (rebuilt on every attempt) and returns the checked JSON body.
    async fn request_json<F>(&self, build: F) -> AppResult<Value>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        retry(&self.retry, || {
            let request = build(&self.http).header(AUTHORIZATION, self.api_key.as_str());
            async move {
                let response = request.send().await?;
                check_response(response).await
            }
        })
        .await
    }

    /// Like `request_json` for endpoints that answer without a body.
    async fn request_status<F>(&self, build: F) -> AppResult<u16>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        retry(&self.retry, || {
            let request = build(&self.http).header(AUTHORIZATION, self.api_key.as_str());
            async move {
                let response = request.send().await?;
                let status = response.status().as_u16();
                reject_failed_status(response).await?;
                Ok(status)
            }
        })
        .await
    }

    async fn fetch_all_supplies(&self) -> AppResult<Vec<Supply>> {
        let limit = config::supplies::PAGE_LIMIT;
        let mut next: i64 = 0;
        let mut supplies = Vec::new();

        loop {
            let url = self.url("/api/v3/supplies");
            let body = self
                .request_json(|http| http.get(&url).query(&[("limit", limit as i64), ("next", next)]))
                .await?;

            let page: Vec<Supply> = parse_field(&body, "supplies")?;
            let page_len = page.len();
            supplies.extend(page);

            let cursor = body.get("next").and_then(Value::as_i64).unwrap_or(0);
            if page_len < limit || cursor == 0 || cursor == next {
                break;
            }
            next = cursor;
        }

        log::info!("Fetched {} supplies", supplies.len());
        Ok(supplies)
    }
}

/// Turns a non-success response into an error.
///
/// Rejections that carry a vendor error body become `AppError::Api`, everything else
/// `AppError::Http`.
async fn reject_failed_status(response: Response) -> AppResult<Response> {
    let Some(status_error) = response.error_for_status_ref().err() else {
        return Ok(response);
    };

    let text = response.text().await.unwrap_or_default();
    if let Some(api_error) = serde_json::from_str::<Value>(&text).ok().as_ref().and_then(vendor_error) {
        log::warn!("Vendor rejected request with {}: {}", status_error, api_error);
        return Err(api_error);
    }
    Err(AppError::Http(status_error))
}

/// Validates a response and returns its JSON body.
pub async fn check_response(response: Response) -> AppResult<Value> {
    let response = reject_failed_status(response).await?;
    let body: Value = response.json().await?;
    match vendor_error(&body) {
        Some(err) => Err(err),
        None => Ok(body),
    }
}

/// Recognizes the two error shapes the vendor uses in a response body:
/// `{"code": .., "message": ..}` and `{"error": true, "errorText": .., "additionalErrors": ..}`.
pub fn vendor_error(body: &Value) -> Option<AppError> {
    let object = body.as_object()?;

    if object.len() == 2 {
        if let (Some(code), Some(message)) = (object.get("code"), object.get("message")) {
            return Some(AppError::api(Some(value_to_string(code)), value_to_string(message)));
        }
    }

    if object.get("error").and_then(Value::as_bool) == Some(true) {
        let text = object.get("errorText").map(value_to_string).unwrap_or_default();
        let additional = object.get("additionalErrors").map(value_to_string).unwrap_or_default();
        return Some(AppError::api(None, format!("{}: {}", text, additional)));
    }

    None
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Deserializes `body[field]`, treating a missing or mistyped field as a vendor error.
fn parse_field<T: DeserializeOwned>(body: &Value, field: &str) -> AppResult<T> {
    let value = body
        .get(field)
        .cloned()
        .ok_or_else(|| AppError::api(None, format!("response has no `{}` field", field)))?;
    serde_json::from_value(value).map_err(|e| AppError::api(None, format!("malformed `{}` payload: {}", field, e)))
}

#[async_trait]
impl Marketplace for WbClient {
    async fn fetch_supplies(&self, only_active: bool, limit: usize) -> AppResult<Vec<Supply>> {
        let supplies = self.fetch_all_supplies().await?;
        // The vendor lists supplies oldest first
        Ok(supplies
            .into_iter()
            .rev()
            .filter(|supply| !only_active || !supply.done)
            .take(limit)
            .collect())
    }

    async fn fetch_orders(&self, supply_id: &str) -> AppResult<Vec<Order>> {
        let url = self.url(&format!("/api/v3/supplies/{}/orders", supply_id));
        let body = self.request_json(|http| http.get(&url)).await?;
        let mut orders: Vec<Order> = parse_field(&body, "orders")?;
        for order in &mut orders {
            order.supply_id = Some(supply_id.to_string());
        }
        Ok(orders)
    }

    async fn fetch_new_orders(&self) -> AppResult<Vec<Order>> {
        let url = self.url("/api/v3/orders/new");
        let body = self.request_json(|http| http.get(&url)).await?;
        parse_field(&body, "orders")
    }

    async fn fetch_product(&self, article: &str) -> AppResult<Product> {
        let url = self.url("/content/v1/cards/filter");
        let payload = json!({ "vendorCodes": [article] });
        let body = self.request_json(|http| http.post(&url).json(&payload)).await?;
        Ok(product_from_cards(&body, article))
    }

    async fn fetch_stickers(&self, order_ids: &[i64]) -> AppResult<Vec<Sticker>> {
        let url = self.url("/api/v3/orders/stickers");
        let payload = json!({ "orders": order_ids });
        let params = [
            ("type", config::label::STICKER_TYPE.to_string()),
            ("width", config::label::STICKER_WIDTH.to_string()),
            ("height", config::label::STICKER_HEIGHT.to_string()),
        ];
        let body = self
            .request_json(|http| http.post(&url).query(&params).json(&payload))
            .await?;
        parse_field(&body, "stickers")
    }

    async fn deliver_supply(&self, supply_id: &str) -> AppResult<u16> {
        let url = self.url(&format!("/api/v3/supplies/{}/deliver", supply_id));
        self.request_status(|http| http.patch(&url)).await
    }

    async fn fetch_supply_barcode(&self, supply_id: &str) -> AppResult<SupplyBarcode> {
        let url = self.url(&format!("/api/v3/supplies/{}/barcode", supply_id));
        let params = [
            ("type", config::label::STICKER_TYPE.to_string()),
            ("width", config::label::STICKER_WIDTH.to_string()),
            ("height", config::label::STICKER_HEIGHT.to_string()),
        ];
        let body = self.request_json(|http| http.get(&url).query(&params)).await?;
        serde_json::from_value(body).map_err(|e| AppError::api(None, format!("malformed supply barcode: {}", e)))
    }
}
