//! The shopping cart and its line items.
//!
//! A [`Cart`] is an ordered list of [`CartLineItem`]s. Insertion order is the
//! display order. Two invariants hold for every `Cart` value, including ones
//! deserialized from storage:
//!
//! - at most one line item per [`ProductId`]
//! - every amount is at least 1
//!
//! All transitions are pure: they return a new `Cart` and leave `self`
//! untouched, so a caller can compute the next state, persist it, and only
//! then commit it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Price, Product, ProductId};

/// Reasons a list of line items is not a valid cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCart {
    /// The same product appears on more than one line.
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),

    /// A line has an amount of zero.
    #[error("product {0} has an amount of zero")]
    ZeroAmount(ProductId),
}

/// A product in the cart together with the requested amount.
///
/// Serialized as the catalog record with an extra `amount` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Catalog record, kept as fetched.
    #[serde(flatten)]
    pub product: Product,
    /// Units requested.
    pub amount: u32,
}

impl CartLineItem {
    /// Create a new line item.
    #[must_use]
    pub const fn new(product: Product, amount: u32) -> Self {
        Self { product, amount }
    }

    /// The product this line refers to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount. A line without a readable price counts as zero.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price().unwrap_or(Price::ZERO).times(self.amount)
    }
}

/// An ordered, duplicate-free list of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCart`] if a product appears twice or an amount is zero.
    pub fn from_items(items: Vec<CartLineItem>) -> Result<Self, InvalidCart> {
        for (index, item) in items.iter().enumerate() {
            if item.amount == 0 {
                return Err(InvalidCart::ZeroAmount(item.product_id()));
            }
            if items
                .iter()
                .take(index)
                .any(|earlier| earlier.product_id() == item.product_id())
            {
                return Err(InvalidCart::DuplicateProduct(item.product_id()));
            }
        }
        Ok(Self { items })
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Iterate over line items in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLineItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line item for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items
            .iter()
            .find(|item| item.product_id() == product_id)
    }

    /// Whether the cart has a line for this product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of every line's subtotal.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartLineItem::subtotal).sum()
    }

    /// Append a new line with amount 1.
    ///
    /// Returns `None` if the product is already in the cart.
    #[must_use]
    pub fn with_product(&self, product: Product) -> Option<Self> {
        if self.contains(product.id) {
            return None;
        }
        let mut items = self.items.clone();
        items.push(CartLineItem::new(product, 1));
        Some(Self { items })
    }

    /// Drop the line for a product.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn without(&self, product_id: ProductId) -> Option<Self> {
        if !self.contains(product_id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.product_id() != product_id)
            .cloned()
            .collect();
        Some(Self { items })
    }

    /// Set the amount of one line, leaving every other line as is.
    ///
    /// Returns `None` if the product is not in the cart or `amount` is zero.
    #[must_use]
    pub fn with_amount(&self, product_id: ProductId, amount: u32) -> Option<Self> {
        if amount == 0 || !self.contains(product_id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.product_id() == product_id {
                    CartLineItem::new(item.product.clone(), amount)
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self { items })
    }
}

impl TryFrom<Vec<CartLineItem>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLineItem;
    type IntoIter = std::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
