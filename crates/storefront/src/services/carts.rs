//! Session cart registry.
//!
//! Each browser session owns one [`CartStore`], keyed by a [`CartId`] kept in
//! the session. Open carts stay in a `moka` cache so concurrent requests from
//! the same session share one store behind a mutex; idle carts are dropped
//! from memory and reloaded from storage on next use.
//!
//! The cache has no size bound. A bounded cache may decline to admit a new
//! entry or evict one a request still holds, and two requests for the same id
//! would then each open their own store.

use std::sync::Arc;
use std::time::Duration;

use galeria_core::storage::cart_key;
use galeria_core::{CartId, CartStore, SnapshotStorage};
use moka::future::Cache;
use tokio::sync::Mutex;

/// A cart shared between requests of one session.
pub type SharedCart = Arc<Mutex<CartStore<Arc<dyn SnapshotStorage>>>>;

/// How long an untouched cart stays in memory.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Open carts, indexed by cart id.
#[derive(Clone)]
pub struct CartRegistry {
    storage: Arc<dyn SnapshotStorage>,
    open: Cache<CartId, SharedCart>,
}

impl CartRegistry {
    /// Create a registry persisting through `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        let open = Cache::builder().time_to_idle(IDLE_TIMEOUT).build();
        Self { storage, open }
    }

    /// The cart for `id`, loading its snapshot if it is not open yet.
    pub async fn cart(&self, id: &CartId) -> SharedCart {
        let storage = Arc::clone(&self.storage);
        let key = cart_key(id);
        self.open
            .get_with(id.clone(), async move {
                tracing::debug!(key = %key, "Opening cart");
                Arc::new(Mutex::new(CartStore::open(storage, key)))
            })
            .await
    }
}
