//! Catalog product and stock types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Price, ProductId};

/// A product record as returned by the catalog API.
///
/// Only `id` is interpreted. Every other catalog field is kept in
/// [`Product::attributes`] under its own key and written back unchanged, so
/// a persisted cart line is the catalog record plus an `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog ID.
    pub id: ProductId,
    /// Catalog attributes, as fetched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    /// Create a product with a title and a price.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Price) -> Self {
        Self::bare(id)
            .with_attribute("title", title.into())
            .with_attribute("price", price_value(price))
    }

    /// Create a product with no attributes besides its id.
    #[must_use]
    pub fn bare(id: ProductId) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    /// Set a catalog attribute. The `id` key is reserved and ignored.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "id" {
            self.attributes.insert(key, value.into());
        }
        self
    }

    /// Display name: `title`, or `name` for catalogs that use that key.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.attributes
            .get("title")
            .or_else(|| self.attributes.get("name"))
            .and_then(Value::as_str)
    }

    /// Unit price, from a JSON number or a decimal string.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        let decimal = match self.attributes.get("price")? {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s.trim()),
            _ => None,
        };
        decimal.map(Price::new)
    }

    /// Product image URL.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.attributes.get("image").and_then(Value::as_str)
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// A price as a JSON number, without trailing zeros (`100`, `179.9`).
fn price_value(price: Price) -> Value {
    serde_json::from_str(&price.amount().normalize().to_string()).unwrap_or(Value::Null)
}

/// Available stock for a product.
///
/// Fetched on demand for every amount change and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSnapshot {
    /// Product the stock belongs to.
    pub product_id: ProductId,
    /// Units currently available.
    pub available: u32,
}

impl StockSnapshot {
    /// Create a new stock snapshot.
    #[must_use]
    pub const fn new(product_id: ProductId, available: u32) -> Self {
        Self {
            product_id,
            available,
        }
    }

    /// Whether `requested` units can be served from this stock.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        self.available >= requested
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_round_trips_catalog_record_verbatim() {
        let record = json!({
            "id": 3,
            "title": "Tênis Adidas Duramo Lite 2.0",
            "price": 219.9,
            "image": "https://example.com/duramo.jpg",
            "brand": "adidas",
            "sizes": [38, 39, 40]
        });

        let product: Product = serde_json::from_value(record.clone()).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.title(), Some("Tênis Adidas Duramo Lite 2.0"));
        assert_eq!(product.price(), Some(Price::from_cents(21_990)));
        assert_eq!(product.image(), Some("https://example.com/duramo.jpg"));

        assert_eq!(serde_json::to_value(&product).unwrap(), record);
    }

    #[test]
    fn test_name_key_is_kept_as_name() {
        let record = json!({ "id": 1, "name": "Shoe", "price": 100 });
        let product: Product = serde_json::from_value(record.clone()).unwrap();

        assert_eq!(product.title(), Some("Shoe"));
        assert_eq!(product.price(), Some(Price::from_cents(10_000)));
        assert_eq!(serde_json::to_value(&product).unwrap(), record);
    }

    #[test]
    fn test_only_id_is_required() {
        let product: Product = serde_json::from_str(r#"{"id": 1, "name": "Shoe"}"#).unwrap();
        assert_eq!(product.price(), None);

        let product: Product = serde_json::from_str(r#"{"id": 1, "price": 10}"#).unwrap();
        assert_eq!(product.title(), None);

        assert!(serde_json::from_str::<Product>(r#"{"name": "Shoe"}"#).is_err());
    }

    #[test]
    fn test_string_price_is_read_and_kept_as_string() {
        let record = json!({ "id": 2, "title": "Shoe", "price": "179.90" });
        let product: Product = serde_json::from_value(record.clone()).unwrap();

        assert_eq!(product.price(), Some(Price::from_cents(17_990)));
        assert_eq!(serde_json::to_value(&product).unwrap(), record);
    }

    #[test]
    fn test_unreadable_price() {
        let product = Product::bare(ProductId::new(1)).with_attribute("price", "free");
        assert_eq!(product.price(), None);
    }

    #[test]
    fn test_new_writes_plain_json_fields() {
        let product = Product::new(ProductId::new(1), "Shoe", Price::from_cents(17_990))
            .with_attribute("id", 99);

        assert_eq!(
            serde_json::to_value(&product).unwrap(),
            json!({ "id": 1, "title": "Shoe", "price": 179.9 })
        );
    }

    #[test]
    fn test_stock_snapshot_covers() {
        let stock = StockSnapshot::new(ProductId::new(1), 5);
        assert!(stock.covers(5));
        assert!(!stock.covers(6));
    }
}
