//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types shared by all RocketShoes components:
//! - `cart` - The cart store library (state, ports, HTTP client, storage)
//! - `cli` - Command-line driver for the cart store
//!
//! # Architecture
//!
//! The core crate contains only types and pure transitions - no I/O, no
//! HTTP clients, no storage. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, catalog products and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
