//! RocketShoes cart store.
//!
//! Client-side shopping-cart state for the storefront: add products, remove
//! them and change their amounts, with every change validated against the
//! stock API and mirrored to durable storage.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart and serializes all mutations
//! - [`api`] holds the catalog and stock ports plus their REST client
//! - [`storage`] holds the key/value persistence port and its backends
//! - [`notify`] turns failures into user-facing messages
//!
//! Operations never return errors to the caller. A failed operation leaves
//! the cart untouched and raises a [`notify::Notification`] instead.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError, ProductCatalog, StockService};
pub use config::{ApiConfig, CartConfig, ConfigError};
pub use error::{CartError, Operation};
pub use notify::{
    Locale, Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier,
};
pub use storage::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, CartStoreBuilder, Outcome, UpdateProductAmount, restore};
