//! Galeria Core - Shared domain library.
//!
//! This crate provides the domain used across all Galeria components:
//! - `storefront` - Public-facing gallery shop and its JSON API
//! - `cli` - Command-line tools for carts, catalog and contact checks
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no network
//! or disk I/O. Persistence is reached through the [`storage::SnapshotStorage`]
//! port so the cart store can run against any backend (including in-memory
//! fakes in tests).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, quantities, prices and emails
//! - [`cart`] - The cart store: line items, mutations, derived totals
//! - [`storage`] - Snapshot persistence port and in-memory backend
//! - [`catalog`] - Catalog entries and browse queries (filter + sort)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod storage;
pub mod types;

pub use cart::{CartSnapshot, CartStore, LineItem, NewLineItem};
pub use catalog::{CatalogEntry, CatalogQuery, Category, SortKey};
pub use storage::{MemoryStorage, SnapshotStorage, StorageError};
pub use types::*;
