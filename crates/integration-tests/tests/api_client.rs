//! Integration tests for the REST client.
//!
//! Runs `ApiClient` against the in-process mock API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rocketshoes_cart::{ApiClient, ApiError, ProductCatalog, StockService};
use rocketshoes_core::{Price, ProductId};
use rocketshoes_integration_tests::MockApi;
use serde_json::json;

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_fetch_product() {
    let api = MockApi::start().await;
    api.add_product(1, "Tênis de Caminhada Leve Confortável", 179.9);
    let client = ApiClient::new(&api.config()).unwrap();

    let product = client.fetch_product(ProductId::new(1)).await.unwrap();

    assert_eq!(product.id, ProductId::new(1));
    assert_eq!(product.title(), Some("Tênis de Caminhada Leve Confortável"));
    assert_eq!(product.price(), Some(Price::from_cents(17_990)));
    assert!(product.image().unwrap().ends_with("tenis1.jpg"));
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let api = MockApi::start().await;
    let client = ApiClient::new(&api.config()).unwrap();

    let err = client.fetch_product(ProductId::new(42)).await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(ref what) if what == "product 42"));
}

#[tokio::test]
async fn test_product_keeps_catalog_keys() {
    let api = MockApi::start().await;
    let record = json!({ "id": 3, "name": "Shoe", "price": "99.90", "color": "red" });
    api.put_product_json(3, record.clone());
    let client = ApiClient::new(&api.config()).unwrap();

    let product = client.fetch_product(ProductId::new(3)).await.unwrap();

    assert_eq!(product.title(), Some("Shoe"));
    assert_eq!(product.price(), Some(Price::from_cents(9_990)));
    assert_eq!(serde_json::to_value(&product).unwrap(), record);
}

#[tokio::test]
async fn test_product_without_id_is_parse_error() {
    let api = MockApi::start().await;
    api.put_product_json(3, json!({ "title": "No id", "price": 10 }));
    let client = ApiClient::new(&api.config()).unwrap();

    let err = client.fetch_product(ProductId::new(3)).await.unwrap_err();

    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_products_are_cached() {
    let api = MockApi::start().await;
    api.add_product(1, "Shoe", 100.0);
    let mut config = api.config();
    config.catalog_cache_ttl = Duration::from_secs(60);
    let client = ApiClient::new(&config).unwrap();

    let first = client.fetch_product(ProductId::new(1)).await.unwrap();
    let second = client.fetch_product(ProductId::new(1)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(api.product_requests(), 1);
}

#[tokio::test]
async fn test_product_cache_can_be_disabled() {
    let api = MockApi::start().await;
    api.add_product(1, "Shoe", 100.0);
    let client = ApiClient::new(&api.config()).unwrap();

    client.fetch_product(ProductId::new(1)).await.unwrap();
    client.fetch_product(ProductId::new(1)).await.unwrap();

    assert_eq!(api.product_requests(), 2);
}

// =============================================================================
// Stock
// =============================================================================

#[tokio::test]
async fn test_fetch_stock() {
    let api = MockApi::start().await;
    api.set_stock(2, 7);
    let client = ApiClient::new(&api.config()).unwrap();

    let stock = client.fetch_stock(ProductId::new(2)).await.unwrap();

    assert_eq!(stock.product_id, ProductId::new(2));
    assert_eq!(stock.available, 7);
}

#[tokio::test]
async fn test_stock_body_with_amount_only() {
    let api = MockApi::start().await;
    api.put_stock_json(4, json!({ "amount": 3 }));
    let client = ApiClient::new(&api.config()).unwrap();

    let stock = client.fetch_stock(ProductId::new(4)).await.unwrap();

    assert_eq!(stock.product_id, ProductId::new(4));
    assert_eq!(stock.available, 3);
}

#[tokio::test]
async fn test_stock_body_extra_keys_are_ignored() {
    let api = MockApi::start().await;
    api.put_stock_json(4, json!({ "id": 4, "amount": 2, "warehouse": "SP" }));
    let client = ApiClient::new(&api.config()).unwrap();

    let stock = client.fetch_stock(ProductId::new(4)).await.unwrap();

    assert_eq!(stock.available, 2);
}

#[tokio::test]
async fn test_negative_stock_is_parse_error() {
    let api = MockApi::start().await;
    api.put_stock_json(4, json!({ "amount": -1 }));
    let client = ApiClient::new(&api.config()).unwrap();

    let err = client.fetch_stock(ProductId::new(4)).await.unwrap_err();

    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_stock_is_never_cached() {
    let api = MockApi::start().await;
    api.set_stock(2, 7);
    let mut config = api.config();
    config.catalog_cache_ttl = Duration::from_secs(60);
    let client = ApiClient::new(&config).unwrap();

    client.fetch_stock(ProductId::new(2)).await.unwrap();
    api.set_stock(2, 1);
    let stock = client.fetch_stock(ProductId::new(2)).await.unwrap();

    assert_eq!(stock.available, 1);
    assert_eq!(api.stock_requests(), 2);
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let api = MockApi::start().await;
    api.set_stock(2, 7);
    api.set_stock_outage(true);
    let client = ApiClient::new(&api.config()).unwrap();

    let err = client.fetch_stock(ProductId::new(2)).await.unwrap_err();

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "inventory offline");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let api = MockApi::start().await;
    let config = api.config();
    drop(api);
    // give the aborted server task a moment to release the port
    tokio::time::sleep(Duration::from_millis(20)).await;

    let client = ApiClient::new(&config).unwrap();
    let err = client.fetch_stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, ApiError::Http(_)));
}
