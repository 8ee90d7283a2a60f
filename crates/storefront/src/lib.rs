//! Galeria storefront library.
//!
//! The JSON API behind the gallery site: catalog browsing, session carts,
//! a checkout stub and the contact form. Exposed as a library so the binary,
//! the CLI and the router tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

pub use catalog::Catalog;
pub use config::StorefrontConfig;
pub use routes::app;
pub use state::AppState;
pub use storage::FileStorage;
