//! REST client for the catalog and stock endpoints.
//!
//! Uses `reqwest` 0.13 for HTTP and caches product records using `moka`.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use rocketshoes_core::{Product, ProductId, StockSnapshot};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, ProductCatalog, StockService};
use crate::config::ApiConfig;

/// Longest slice of a response body copied into logs and errors.
const MAX_BODY_EXCERPT: usize = 200;

/// Body of `GET /stock/{id}`. Other keys are ignored.
#[derive(Deserialize)]
struct StockLevel {
    amount: u32,
}

/// Client for the storefront REST API.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Option<Cache<ProductId, Product>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let products = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `{base}/{resource}/{id}`, keeping any path prefix in the base.
    fn endpoint(&self, resource: &str, product_id: ProductId) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push(resource)
            .push(&product_id.to_string());
        Ok(url)
    }

    /// GET a JSON document.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, ApiError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(what.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt(&body),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&product_id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint("products", product_id)?;
        let product: Product = self
            .get_json(url, &format!("product {product_id}"))
            .await?;

        if let Some(cache) = &self.inner.products {
            cache.insert(product_id, product.clone()).await;
        }

        Ok(product)
    }

    /// Get the current stock for a product. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the stock record is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_stock(&self, product_id: ProductId) -> Result<StockSnapshot, ApiError> {
        let url = self.endpoint("stock", product_id)?;
        let level: StockLevel = self.get_json(url, &format!("stock {product_id}")).await?;
        debug!(available = level.amount, "Fetched stock");
        Ok(StockSnapshot::new(product_id, level.amount))
    }
}

#[async_trait]
impl ProductCatalog for ApiClient {
    async fn fetch_product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        self.get_product(product_id).await
    }
}

#[async_trait]
impl StockService for ApiClient {
    async fn fetch_stock(&self, product_id: ProductId) -> Result<StockSnapshot, ApiError> {
        self.get_stock(product_id).await
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_BODY_EXCERPT).collect()
}
