//! Cart operation errors and their user-facing translation.
//!
//! [`CartError`] never leaves the store. At the operation boundary it is
//! logged and mapped to a [`Notification`] via [`CartError::notification`].

use rocketshoes_core::{InvalidCart, ProductId};
use thiserror::Error;

use crate::api::ApiError;
use crate::notify::{Locale, Notification, NotificationKind};
use crate::storage::StorageError;

/// The store operation an error was raised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

/// Why a cart operation did not apply.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The catalog lookup failed.
    #[error("Catalog lookup failed: {0}")]
    Catalog(#[source] ApiError),

    /// The stock lookup failed.
    #[error("Stock lookup failed: {0}")]
    Stock(#[source] ApiError),

    /// The catalog answered with a different product than requested.
    #[error("Catalog returned product {returned} when asked for {requested}")]
    CatalogMismatch {
        requested: ProductId,
        returned: ProductId,
    },

    /// More units were requested than are in stock.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: u32,
    },

    /// Amount was zero or negative.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// The transition would break a cart invariant.
    #[error("Invalid cart: {0}")]
    Invalid(#[from] InvalidCart),

    /// The new snapshot could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// The notification shown for this error, if any.
    ///
    /// Invalid amounts are ignored silently. Stock lookup failures during an
    /// update surface the underlying error's message.
    #[must_use]
    pub fn notification(&self, operation: Operation, locale: Locale) -> Option<Notification> {
        let generic = match operation {
            Operation::Add => NotificationKind::AddFailed,
            Operation::Remove => NotificationKind::RemoveFailed,
            Operation::Update => NotificationKind::UpdateFailed,
        };

        match self {
            Self::InvalidAmount(_) => None,
            Self::InsufficientStock { .. } => {
                Some(Notification::new(NotificationKind::OutOfStock, locale))
            }
            Self::Stock(source) => Some(Notification::with_message(
                generic,
                locale,
                &source.to_string(),
            )),
            _ => Some(Notification::new(generic, locale)),
        }
    }

    /// Whether the error comes from a remote or storage fault rather than
    /// from the request itself.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::Catalog(_) | Self::Stock(_) | Self::CatalogMismatch { .. } | Self::Storage(_)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::NotInCart(ProductId::new(3));
        assert_eq!(err.to_string(), "Product 3 is not in the cart");

        let err = CartError::InsufficientStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        };
        assert_eq!(err.to_string(), "Requested 3 of product 1, only 2 in stock");
    }

    #[test]
    fn test_invalid_amount_is_silent() {
        let err = CartError::InvalidAmount(0);
        assert!(err.notification(Operation::Update, Locale::PtBr).is_none());
    }

    #[test]
    fn test_generic_message_per_operation() {
        let err = CartError::NotInCart(ProductId::new(1));
        assert_eq!(
            err.notification(Operation::Remove, Locale::PtBr).unwrap().message,
            "Erro na remoção do produto"
        );
        assert_eq!(
            err.notification(Operation::Update, Locale::PtBr).unwrap().message,
            "Erro na alteração de quantidade do produto"
        );

        let err = CartError::Catalog(ApiError::NotFound("product 1".to_string()));
        assert_eq!(
            err.notification(Operation::Add, Locale::PtBr).unwrap().kind,
            NotificationKind::AddFailed
        );
    }

    #[test]
    fn test_out_of_stock_message() {
        let err = CartError::InsufficientStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        };
        let n = err.notification(Operation::Update, Locale::En).unwrap();
        assert_eq!(n.kind, NotificationKind::OutOfStock);
        assert_eq!(n.message, "Requested amount is out of stock");
    }

    #[test]
    fn test_stock_failure_uses_source_message() {
        let err = CartError::Stock(ApiError::RateLimited(5));
        let n = err.notification(Operation::Update, Locale::PtBr).unwrap();
        assert_eq!(n.kind, NotificationKind::UpdateFailed);
        assert_eq!(n.message, "Rate limited, retry after 5 seconds");
    }

    #[test]
    fn test_fault_classification() {
        assert!(CartError::Stock(ApiError::RateLimited(1)).is_fault());
        assert!(!CartError::NotInCart(ProductId::new(1)).is_fault());
        assert!(!CartError::InvalidAmount(-1).is_fault());
    }
}
