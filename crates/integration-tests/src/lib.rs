//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - REST client against a mock API
//! - `cart_flow` - Full store over the REST client and file storage
//!
//! The mock API is an `axum` router bound to an ephemeral local port. It
//! serves `GET /products/{id}` and `GET /stock/{id}` from in-memory tables
//! that tests can change while the server runs, and counts every request.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::ApiConfig;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

#[derive(Default)]
struct Inventory {
    products: HashMap<i32, Value>,
    stock: HashMap<i32, Value>,
    product_requests: usize,
    stock_requests: usize,
    stock_outage: bool,
}

/// Shared, mutable contents of the mock API.
#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inventory>>,
}

impl MockState {
    fn with<R>(&self, f: impl FnOnce(&mut Inventory) -> R) -> R {
        f(&mut self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// A running mock catalog/stock API.
pub struct MockApi {
    addr: SocketAddr,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Start the server on `127.0.0.1` with an OS-assigned port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/products/{id}", get(product))
            .route("/stock/{id}", get(stock))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind mock API: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("mock API has no local address: {e}"));

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the server.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr))
            .unwrap_or_else(|e| panic!("invalid mock API URL: {e}"))
    }

    /// Client configuration pointing at this server, product cache disabled.
    #[must_use]
    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url(),
            timeout: Duration::from_secs(5),
            catalog_cache_ttl: Duration::ZERO,
        }
    }

    /// Register a catalog product.
    pub fn add_product(&self, id: i32, title: &str, price: f64) {
        let image =
            format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg");
        self.put_product_json(
            id,
            json!({ "id": id, "title": title, "price": price, "image": image }),
        );
    }

    /// Register an arbitrary JSON body for `/products/{id}`.
    pub fn put_product_json(&self, id: i32, body: Value) {
        self.state.with(|inv| inv.products.insert(id, body));
    }

    /// Set the available stock for a product. The body is `{"amount": n}`.
    pub fn set_stock(&self, id: i32, amount: u32) {
        self.put_stock_json(id, json!({ "amount": amount }));
    }

    /// Register an arbitrary JSON body for `/stock/{id}`.
    pub fn put_stock_json(&self, id: i32, body: Value) {
        self.state.with(|inv| inv.stock.insert(id, body));
    }

    /// Make every stock request fail with a 500.
    pub fn set_stock_outage(&self, outage: bool) {
        self.state.with(|inv| inv.stock_outage = outage);
    }

    /// Number of `/products/{id}` requests served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.with(|inv| inv.product_requests)
    }

    /// Number of `/stock/{id}` requests served.
    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.with(|inv| inv.stock_requests)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn product(State(state): State<MockState>, Path(id): Path<i32>) -> Response {
    let body = state.with(|inv| {
        inv.product_requests += 1;
        inv.products.get(&id).cloned()
    });

    match body {
        Some(body) => Json(body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn stock(State(state): State<MockState>, Path(id): Path<i32>) -> Response {
    let (outage, body) = state.with(|inv| {
        inv.stock_requests += 1;
        (inv.stock_outage, inv.stock.get(&id).cloned())
    });

    if outage {
        return (StatusCode::INTERNAL_SERVER_ERROR, "inventory offline").into_response();
    }

    match body {
        Some(body) => Json(body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
