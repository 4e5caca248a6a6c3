//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! rs-cli show
//!
//! # Add one unit of product 1
//! rs-cli add 1
//!
//! # Set product 1 to 3 units (checked against stock)
//! rs-cli update 1 3
//!
//! # Remove product 1
//! rs-cli remove 1
//!
//! # Delete the persisted cart
//! rs-cli clear
//! ```
//!
//! # Environment Variables
//!
//! See `rocketshoes_cart::config` for the full list. The most relevant are
//! `ROCKETSHOES_API_URL` and `ROCKETSHOES_STORAGE_DIR`.

use std::path::Path;
use std::sync::Arc;

use rocketshoes_cart::{
    ApiClient, ApiError, CART_STORAGE_KEY, CartConfig, CartStorage, CartStore, FileStorage,
    Outcome, RecordingNotifier, StorageError, UpdateProductAmount, restore,
};
use rocketshoes_core::{Cart, ProductId};
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// The API client could not be created.
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The store rejected the operation.
    #[error("{0}")]
    Rejected(String),
}

/// A store wired to the configured API and file storage.
struct Session {
    store: CartStore,
    notifier: Arc<RecordingNotifier>,
}

impl Session {
    fn open(config: &CartConfig) -> Result<Self, CartCommandError> {
        let api = ApiClient::new(&config.api)?;
        let storage = Arc::new(FileStorage::new(&config.storage_dir));
        let notifier = Arc::new(RecordingNotifier::new());

        tracing::debug!(
            api = %api.base_url(),
            storage = %storage.dir().display(),
            "Opening cart"
        );

        let store = CartStore::with_api(api, storage)
            .notifier(notifier.clone())
            .locale(config.locale)
            .build();

        Ok(Self { store, notifier })
    }

    /// Log the result of an operation and turn notifications into an error.
    fn finish(&self, outcome: Outcome) -> Result<(), CartCommandError> {
        let notifications = self.notifier.take();
        for notification in &notifications {
            tracing::warn!("{notification}");
        }

        match outcome {
            Outcome::Applied => {
                render(&self.store.cart());
                Ok(())
            }
            Outcome::Ignored => {
                tracing::info!("Amount must be at least 1; cart unchanged");
                Ok(())
            }
            Outcome::Rejected => Err(CartCommandError::Rejected(
                notifications
                    .into_iter()
                    .map(|n| n.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }
}

/// Show the persisted cart. Reads storage only; the API is not contacted.
pub fn show(config: &CartConfig) {
    render(&saved_cart(&config.storage_dir));
}

fn saved_cart(storage_dir: &Path) -> Cart {
    restore(&FileStorage::new(storage_dir), CART_STORAGE_KEY)
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns error if setup fails or the store rejects the addition.
pub async fn add(config: &CartConfig, product_id: ProductId) -> Result<(), CartCommandError> {
    let session = Session::open(config)?;
    let outcome = session.store.add_product(product_id).await;
    session.finish(outcome)
}

/// Remove a product.
///
/// # Errors
///
/// Returns error if setup fails or the product is not in the cart.
pub async fn remove(config: &CartConfig, product_id: ProductId) -> Result<(), CartCommandError> {
    let session = Session::open(config)?;
    let outcome = session.store.remove_product(product_id).await;
    session.finish(outcome)
}

/// Set a product's amount.
///
/// # Errors
///
/// Returns error if setup fails or the store rejects the update.
pub async fn update(
    config: &CartConfig,
    product_id: ProductId,
    amount: i64,
) -> Result<(), CartCommandError> {
    let session = Session::open(config)?;
    let outcome = session
        .store
        .update_product_amount(UpdateProductAmount::new(product_id, amount))
        .await;
    session.finish(outcome)
}

/// Delete the persisted cart.
///
/// # Errors
///
/// Returns error if the snapshot cannot be deleted.
pub fn clear(config: &CartConfig) -> Result<(), CartCommandError> {
    let storage = FileStorage::new(&config.storage_dir);
    storage.remove(CART_STORAGE_KEY)?;
    tracing::info!("Cart cleared");
    Ok(())
}

/// Log the cart line by line.
fn render(cart: &Cart) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for item in cart {
        tracing::info!(
            "  #{:<4} {:<40} {:>3} x {:>9} = {:>10}",
            item.product.id.as_i32(),
            item.product.title().unwrap_or("(untitled)"),
            item.amount,
            item.product
                .price()
                .map_or_else(|| "-".to_string(), |price| price.to_string()),
            item.subtotal().to_string()
        );
    }
    tracing::info!(
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    );
}
