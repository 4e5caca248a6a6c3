//! Catalog and stock API access.
//!
//! # Architecture
//!
//! The store talks to the backend through two ports:
//!
//! - [`ProductCatalog`] - product id to product record (`GET /products/{id}`)
//! - [`StockService`] - product id to available amount (`GET /stock/{id}`)
//!
//! [`ApiClient`] implements both against the storefront's JSON REST API.
//! Product records are cached in memory via `moka`; stock is always fetched
//! fresh because every amount change must be validated against the current
//! inventory.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::api::{ApiClient, ProductCatalog, StockService};
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let product = client.fetch_product(ProductId::new(1)).await?;
//! let stock = client.fetch_stock(product.id).await?;
//! ```

mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, StockSnapshot};
use thiserror::Error;

/// Errors that can occur when calling the catalog or stock API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot have paths appended.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Source of product records.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch the catalog record for a product.
    async fn fetch_product(&self, product_id: ProductId) -> Result<Product, ApiError>;
}

/// Source of current stock levels.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the amount currently available for a product.
    async fn fetch_stock(&self, product_id: ProductId) -> Result<StockSnapshot, ApiError>;
}
