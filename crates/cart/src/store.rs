//! The cart store.
//!
//! [`CartStore`] owns the authoritative [`Cart`]. It exposes one read and
//! three fire-and-forget mutations:
//!
//! - [`CartStore::add_product`]
//! - [`CartStore::remove_product`]
//! - [`CartStore::update_product_amount`]
//!
//! Every mutation is an atomic read-modify-write. The store's mutex is held
//! from the moment the current cart is read until the next one is persisted
//! and published, including across catalog and stock lookups, so concurrent
//! calls are applied one after another in arrival order and never act on a
//! stale cart. A mutation either persists and publishes a new cart or leaves
//! the old one in place and raises a notification.
//!
//! Readers never wait on an in-flight mutation: [`CartStore::cart`] and
//! [`CartStore::subscribe`] observe the last published snapshot.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use rocketshoes_cart::{ApiClient, CartStore, FileStorage, UpdateProductAmount};
//!
//! let api = ApiClient::new(&config.api)?;
//! let store = CartStore::with_api(api, Arc::new(FileStorage::new(&config.storage_dir)))
//!     .locale(config.locale)
//!     .build();
//!
//! store.add_product(ProductId::new(1)).await;
//! store
//!     .update_product_amount(UpdateProductAmount::new(ProductId::new(1), 3))
//!     .await;
//! ```

use std::sync::Arc;

use rocketshoes_core::{Cart, InvalidCart, ProductId};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ApiClient, ProductCatalog, StockService};
use crate::error::{CartError, Operation};
use crate::notify::{Locale, Notifier, TracingNotifier};
use crate::storage::{CART_STORAGE_KEY, CartStorage, StorageError};

/// Arguments of [`CartStore::update_product_amount`].
///
/// `amount` is signed: zero or negative requests are accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

impl UpdateProductAmount {
    #[must_use]
    pub const fn new(product_id: ProductId, amount: i64) -> Self {
        Self { product_id, amount }
    }
}

/// What a mutation did. Carries no failure cause; see the notifier for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new cart was persisted and published.
    Applied,
    /// The request was a no-op by policy.
    Ignored,
    /// The request failed and a notification was raised.
    Rejected,
}

impl Outcome {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Builder for [`CartStore`].
pub struct CartStoreBuilder {
    catalog: Arc<dyn ProductCatalog>,
    stock: Arc<dyn StockService>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
    locale: Locale,
    storage_key: String,
}

impl CartStoreBuilder {
    /// Where notifications go. Defaults to [`TracingNotifier`].
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Notification language. Defaults to [`Locale::PtBr`].
    #[must_use]
    pub const fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Storage key of the snapshot. Defaults to [`CART_STORAGE_KEY`].
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Restore the persisted cart and create the store.
    ///
    /// A missing snapshot yields an empty cart. So does an unreadable or
    /// invalid one, after logging a warning; it is overwritten by the next
    /// successful mutation.
    #[must_use]
    pub fn build(self) -> CartStore {
        let cart = restore(self.storage.as_ref(), &self.storage_key);
        info!(items = cart.len(), "Cart restored");

        let (published, _) = watch::channel(cart.clone());

        CartStore {
            inner: Arc::new(CartStoreInner {
                catalog: self.catalog,
                stock: self.stock,
                storage: self.storage,
                notifier: self.notifier,
                locale: self.locale,
                storage_key: self.storage_key,
                state: Mutex::new(cart),
                published,
            }),
        }
    }
}

/// Cart state container.
///
/// Cheaply cloneable via `Arc`; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    catalog: Arc<dyn ProductCatalog>,
    stock: Arc<dyn StockService>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
    locale: Locale,
    storage_key: String,
    /// Authoritative cart; held for the whole of each mutation.
    state: Mutex<Cart>,
    /// Last committed cart, for readers and subscribers.
    published: watch::Sender<Cart>,
}

impl CartStore {
    /// Start building a store over the given collaborators.
    #[must_use]
    pub fn builder(
        catalog: Arc<dyn ProductCatalog>,
        stock: Arc<dyn StockService>,
        storage: Arc<dyn CartStorage>,
    ) -> CartStoreBuilder {
        CartStoreBuilder {
            catalog,
            stock,
            storage,
            notifier: Arc::new(TracingNotifier),
            locale: Locale::default(),
            storage_key: CART_STORAGE_KEY.to_string(),
        }
    }

    /// Start building a store that uses one [`ApiClient`] for both lookups.
    #[must_use]
    pub fn with_api(api: ApiClient, storage: Arc<dyn CartStorage>) -> CartStoreBuilder {
        let api = Arc::new(api);
        Self::builder(api.clone(), api, storage)
    }

    /// The current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.published.borrow().clone()
    }

    /// Observe every cart published from now on.
    ///
    /// The receiver starts out holding the current cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.published.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart goes through the same stock check as
    /// [`update_product_amount`](Self::update_product_amount) with its amount
    /// plus one. A new product is looked up in the catalog and appended with
    /// amount 1.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Outcome {
        let mut cart = self.inner.state.lock().await;

        if let Some(item) = cart.get(product_id) {
            let amount = i64::from(item.amount) + 1;
            debug!(amount, "Product already in cart, incrementing");
            let result = self.next_with_amount(&cart, product_id, amount).await;
            return self.commit(Operation::Update, &mut cart, result);
        }

        let result = self.next_with_new_product(&cart, product_id).await;
        self.commit(Operation::Add, &mut cart, result)
    }

    /// Remove a product's line.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Outcome {
        let mut cart = self.inner.state.lock().await;
        let result = cart
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id));
        self.commit(Operation::Remove, &mut cart, result)
    }

    /// Set a product's amount after checking it against current stock.
    ///
    /// Amounts of zero or less are ignored without contacting the stock
    /// service. Use [`remove_product`](Self::remove_product) to drop a line.
    #[instrument(
        skip(self, update),
        fields(product_id = %update.product_id, amount = update.amount)
    )]
    pub async fn update_product_amount(&self, update: UpdateProductAmount) -> Outcome {
        let mut cart = self.inner.state.lock().await;
        let result = self
            .next_with_amount(&cart, update.product_id, update.amount)
            .await;
        self.commit(Operation::Update, &mut cart, result)
    }

    async fn next_with_new_product(
        &self,
        cart: &Cart,
        product_id: ProductId,
    ) -> Result<Cart, CartError> {
        let product = self
            .inner
            .catalog
            .fetch_product(product_id)
            .await
            .map_err(CartError::Catalog)?;

        if product.id != product_id {
            return Err(CartError::CatalogMismatch {
                requested: product_id,
                returned: product.id,
            });
        }

        cart.with_product(product)
            .ok_or(CartError::Invalid(InvalidCart::DuplicateProduct(product_id)))
    }

    async fn next_with_amount(
        &self,
        cart: &Cart,
        product_id: ProductId,
        amount: i64,
    ) -> Result<Cart, CartError> {
        if amount <= 0 {
            return Err(CartError::InvalidAmount(amount));
        }
        if !cart.contains(product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        let stock = self
            .inner
            .stock
            .fetch_stock(product_id)
            .await
            .map_err(CartError::Stock)?;

        let insufficient = || CartError::InsufficientStock {
            product_id,
            requested: amount,
            available: stock.available,
        };
        if i64::from(stock.available) < amount {
            return Err(insufficient());
        }
        let amount = u32::try_from(amount).map_err(|_| insufficient())?;

        cart.with_amount(product_id, amount)
            .ok_or(CartError::NotInCart(product_id))
    }

    /// Persist and publish `result`, or report why there is nothing to commit.
    fn commit(
        &self,
        operation: Operation,
        cart: &mut Cart,
        result: Result<Cart, CartError>,
    ) -> Outcome {
        match result.and_then(|next| self.persist(&next).map(|()| next)) {
            Ok(next) => {
                debug!(?operation, items = next.len(), "Cart updated");
                *cart = next.clone();
                self.inner.published.send_replace(next);
                Outcome::Applied
            }
            Err(CartError::InvalidAmount(amount)) => {
                debug!(amount, "Ignoring non-positive amount");
                Outcome::Ignored
            }
            Err(err) => {
                if err.is_fault() {
                    error!(?operation, error = %err, "Cart operation failed");
                } else {
                    warn!(?operation, error = %err, "Cart operation rejected");
                }
                if let Some(notification) = err.notification(operation, self.inner.locale) {
                    self.inner.notifier.notify(notification);
                }
                Outcome::Rejected
            }
        }
    }

    fn persist(&self, cart: &Cart) -> Result<(), CartError> {
        let snapshot = serde_json::to_string(cart).map_err(StorageError::from)?;
        self.inner
            .storage
            .save(&self.inner.storage_key, &snapshot)?;
        Ok(())
    }
}

/// Read the cart persisted under `key`, falling back to an empty one.
///
/// Missing, unreadable and invalid snapshots all yield an empty cart; the
/// last two are logged as warnings.
#[must_use]
pub fn restore(storage: &dyn CartStorage, key: &str) -> Cart {
    match storage.load(key) {
        Ok(Some(snapshot)) => serde_json::from_str(&snapshot).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding invalid cart snapshot");
            Cart::new()
        }),
        Ok(None) => Cart::new(),
        Err(e) => {
            warn!(error = %e, "Could not read cart snapshot, starting empty");
            Cart::new()
        }
    }
}
