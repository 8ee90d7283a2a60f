//! Application state shared across handlers.

use std::sync::Arc;

use galeria_core::{MemoryStorage, SnapshotStorage, StorageError};

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::carts::CartRegistry;
use crate::services::email::{MailError, SharedMailer, mailer_from_config};
use crate::storage::FileStorage;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cart storage: {0}")]
    Storage(#[from] StorageError),
    #[error("mail provider: {0}")]
    Mail(#[from] MailError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    carts: CartRegistry,
    mailer: Option<SharedMailer>,
}

impl AppState {
    /// Assemble state from already-built parts.
    ///
    /// Tests use this to inject `MemoryStorage` and a recording mailer.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        storage: Arc<dyn SnapshotStorage>,
        mailer: Option<SharedMailer>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                carts: CartRegistry::new(storage),
                mailer,
            }),
        }
    }

    /// Build state from configuration: file or memory cart storage, the
    /// built-in catalog, and whichever mail provider is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created or the
    /// mail provider cannot be constructed.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let storage: Arc<dyn SnapshotStorage> = match &config.cart_storage_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "Cart snapshots stored on disk");
                Arc::new(FileStorage::open(dir)?)
            }
            None => {
                tracing::warn!("CART_STORAGE_DIR not set, carts are kept in memory only");
                Arc::new(MemoryStorage::new())
            }
        };

        let mailer = mailer_from_config(&config.mail)?;
        if mailer.is_none() {
            tracing::warn!("No mail provider configured, contact form will answer 500");
        }

        Ok(Self::new(config, Catalog::builtin(), storage, mailer))
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Session cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// Configured mail provider, if any.
    #[must_use]
    pub fn mailer(&self) -> Option<&SharedMailer> {
        self.inner.mailer.as_ref()
    }
}
