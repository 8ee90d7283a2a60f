//! The cart store.
//!
//! A [`CartStore`] is the single source of truth for one shopper's cart. It
//! holds an ordered list of [`LineItem`]s, at most one per id, and writes a
//! [`CartSnapshot`] through its [`SnapshotStorage`] port after every mutation.
//!
//! # Semantics
//!
//! - Quantities are always clamped to `[1, 999]`; invalid input is normalized,
//!   never rejected.
//! - Adding an id that is already in the cart grows that line in place;
//!   insertion order is otherwise preserved.
//! - Operations on an absent id are no-ops.
//! - A failed write is logged and swallowed. The in-memory items stay
//!   authoritative for the rest of the session.
//!
//! # Example
//!
//! ```
//! use galeria_core::{CartStore, MemoryStorage, NewLineItem};
//!
//! let mut cart = CartStore::open(MemoryStorage::new(), "cart:v1");
//! cart.add(NewLineItem::new("a", "Luz en Silencio", 10.0), 2.0);
//! cart.add(NewLineItem::new("b", "Retícula", 5.5), 1.0);
//!
//! assert_eq!(cart.count(), 3);
//! assert!((cart.total() - 25.5).abs() < f64::EPSILON);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{SnapshotStorage, decode_snapshot, encode_snapshot};
use crate::types::{ItemId, Quantity};

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Merge key: unique within a cart.
    pub id: ItemId,
    /// Display label captured when the line was first added.
    pub name: String,
    /// Price of one piece in the shop currency.
    pub unit_price: f64,
    /// Number of pieces.
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LineItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity.get())
    }
}

/// Everything about an item except its quantity; the payload of [`CartStore::add`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub id: ItemId,
    pub name: String,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewLineItem {
    /// Create an add payload without an image.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image_url: None,
        }
    }

    /// Attach a display image.
    #[must_use]
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    fn into_line(self, quantity: Quantity) -> LineItem {
        LineItem {
            id: self.id,
            name: self.name,
            unit_price: self.unit_price,
            quantity,
            image_url: self.image_url,
        }
    }
}

/// Persisted form of a cart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    /// When the snapshot was written. Concurrent writers resolve last-write-wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Cart state plus the port it persists through.
#[derive(Debug)]
pub struct CartStore<S> {
    items: Vec<LineItem>,
    storage: S,
    key: String,
}

impl<S: SnapshotStorage> CartStore<S> {
    /// Open the cart persisted under `key`.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty cart. Duplicate
    /// ids in a foreign snapshot are merged so the store's invariants hold.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = match storage.load(&key) {
            Ok(Some(raw)) => match decode_snapshot(&raw) {
                Ok(snapshot) => merge_duplicates(snapshot.items),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding unreadable cart snapshot");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cart storage unavailable, starting empty");
                Vec::new()
            }
        };

        Self {
            items,
            storage,
            key,
        }
    }

    /// Add `quantity` pieces of `item`.
    ///
    /// An existing line with the same id grows to `clamp(existing + clamp(quantity))`;
    /// otherwise a new line is appended.
    pub fn add(&mut self, item: NewLineItem, quantity: f64) {
        let quantity = Quantity::clamp(quantity);

        if let Some(line) = self.items.iter_mut().find(|line| line.id == item.id) {
            line.quantity = line.quantity.offset(f64::from(quantity.get()));
        } else {
            self.items.push(item.into_line(quantity));
        }

        self.persist();
    }

    /// Add a single piece of `item`.
    pub fn add_one(&mut self, item: NewLineItem) {
        self.add(item, 1.0);
    }

    /// Delete the line with `id`, if any.
    pub fn remove(&mut self, id: &str) {
        self.items.retain(|line| line.id.as_str() != id);
        self.persist();
    }

    /// Replace the quantity of the line with `id` by `clamp(quantity)`.
    pub fn set_quantity(&mut self, id: &str, quantity: f64) {
        if let Some(line) = self.line_mut(id) {
            line.quantity = Quantity::clamp(quantity);
        }
        self.persist();
    }

    /// Grow the line with `id` by `step` pieces.
    pub fn increment(&mut self, id: &str, step: f64) {
        let Some(current) = self.get(id).map(|line| line.quantity) else {
            return;
        };
        self.set_quantity(id, f64::from(current.offset(step).get()));
    }

    /// Shrink the line with `id` by `step` pieces, never below one.
    pub fn decrement(&mut self, id: &str, step: f64) {
        let Some(current) = self.get(id).map(|line| line.quantity) else {
            return;
        };
        self.set_quantity(id, f64::from(current.offset(-step).get()));
    }

    /// Empty the cart and delete its snapshot.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "Failed to delete cart snapshot");
        }
    }

    /// Total pieces across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of `unit_price × quantity` across all lines.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .fold(0.0, |total, line| total + line.line_total())
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The line with `id`, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|line| line.id.as_str() == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Storage key this cart persists under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current state, stamped with the time of the call.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            saved_at: Some(Utc::now()),
        }
    }

    fn line_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|line| line.id.as_str() == id)
    }

    fn persist(&self) {
        let result = encode_snapshot(&self.snapshot())
            .and_then(|raw| self.storage.save(&self.key, &raw));

        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist cart snapshot");
        }
    }
}

/// Fold lines sharing an id into the first occurrence, summing quantities.
fn merge_duplicates(lines: Vec<LineItem>) -> Vec<LineItem> {
    let mut merged: Vec<LineItem> = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(existing) = merged.iter_mut().find(|m| m.id == line.id) {
            existing.quantity = existing.quantity.offset(f64::from(line.quantity.get()));
        } else {
            merged.push(line);
        }
    }
    merged
}
