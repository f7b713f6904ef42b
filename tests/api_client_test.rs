//! WbClient against a wiremock server

use pretty_assertions::assert_eq;
use serde_json::json;
use wbstickers::api::{Marketplace, WbClient};
use wbstickers::core::retry::RetryConfig;
use wbstickers::core::AppError;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn client(server: &MockServer) -> WbClient {
    WbClient::new(server.uri(), API_KEY)
        .unwrap()
        .with_retry(RetryConfig::new().max_retries(0))
}

fn supply(id: &str, done: bool) -> serde_json::Value {
    json!({"id": id, "name": format!("Поставка {}", id), "createdAt": "2023-02-01T10:00:00Z", "closedAt": null, "done": done})
}

#[tokio::test]
async fn test_fetch_orders_sends_key_and_tags_supply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/supplies/WB-GI-1/orders"))
        .and(header("Authorization", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orders": [
            {"id": 101, "article": "A1", "createdAt": "2023-02-01T10:00:00Z", "price": 1000},
            {"id": 102, "article": "A2", "createdAt": "2023-02-01T11:00:00Z"}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let orders = client(&server).fetch_orders("WB-GI-1").await.unwrap();

    assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![101, 102]);
    assert!(orders.iter().all(|o| o.supply_id.as_deref() == Some("WB-GI-1")));
}

#[tokio::test]
async fn test_fetch_supplies_is_newest_first_and_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/supplies"))
        .and(query_param("limit", "1000"))
        .and(query_param("next", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": 3,
            "supplies": [supply("S1", true), supply("S2", false), supply("S3", false)]
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let active = api.fetch_supplies(true, 50).await.unwrap();
    assert_eq!(active.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["S3", "S2"]);

    let latest = api.fetch_supplies(false, 1).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, "S3");
}

#[tokio::test]
async fn test_fetch_stickers_is_one_batched_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/orders/stickers"))
        .and(query_param("type", "png"))
        .and(query_param("width", "58"))
        .and(query_param("height", "40"))
        .and(body_json(json!({"orders": [101, 102]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stickers": [
            {"orderId": 101, "file": "aGVsbG8=", "partA": 1, "partB": 2},
            {"orderId": 102, "file": "d29ybGQ=", "partA": 3, "partB": 4}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let stickers = client(&server).fetch_stickers(&[101, 102]).await.unwrap();

    assert_eq!(stickers.len(), 2);
    assert_eq!(stickers[1].order_id, 102);
    assert_eq!(stickers[1].file, "d29ybGQ=");
}

#[tokio::test]
async fn test_fetch_product_parses_card() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content/v1/cards/filter"))
        .and(body_json(json!({"vendorCodes": ["A1"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"vendorCode": "A1", "characteristics": [{"Наименование": "Widget"}], "sizes": [{"skus": ["000111"]}]}],
            "error": false,
            "errorText": "",
            "additionalErrors": null
        })))
        .mount(&server)
        .await;

    let product = client(&server).fetch_product("A1").await.unwrap();

    assert_eq!(product.name, "Widget");
    assert_eq!(product.barcode, "000111");
}

#[tokio::test]
async fn test_vendor_error_flag_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content/v1/cards/filter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "error": true,
            "errorText": "Invalid vendor code",
            "additionalErrors": "A1"
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_product("A1").await.unwrap_err();

    assert_eq!(err.to_string(), "Wildberries API error: Invalid vendor code: A1");
}

#[tokio::test]
async fn test_rejected_request_with_code_body_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/orders/new"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"code": "Unauthorized", "message": "invalid token"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).fetch_new_orders().await.unwrap_err();

    match err {
        AppError::Api { code, message } => {
            assert_eq!(code.as_deref(), Some("Unauthorized"));
            assert_eq!(message, "invalid token");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_http_error_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/orders/new"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .expect(1)
        .mount(&server)
        .await;

    let api = WbClient::new(server.uri(), API_KEY)
        .unwrap()
        .with_retry(RetryConfig::new().max_retries(3).step(std::time::Duration::ZERO));
    let err = api.fetch_new_orders().await.unwrap_err();

    assert!(matches!(err, AppError::Http(_)));
}

#[tokio::test]
async fn test_deliver_returns_status_and_barcode_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v3/supplies/WB-GI-1/deliver"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/supplies/WB-GI-1/barcode"))
        .and(query_param("type", "png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"barcode": "WB-GI-1", "file": "aGVsbG8="})))
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(api.deliver_supply("WB-GI-1").await.unwrap(), 204);

    let barcode = api.fetch_supply_barcode("WB-GI-1").await.unwrap();
    assert_eq!(barcode.barcode, "WB-GI-1");
    assert_eq!(barcode.file, "aGVsbG8=");
}
