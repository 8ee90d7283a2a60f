//! File-backed cart commands.
//!
//! Operates on the same snapshot files the storefront writes when
//! `CART_STORAGE_DIR` is set, so an operator can inspect or repair a
//! shopper's cart by id.

use std::path::Path;

use clap::Subcommand;
use galeria_core::storage::cart_key;
use galeria_core::{CartId, CartStore, NewLineItem, Price, StorageError};
use galeria_storefront::{Catalog, FileStorage};
use thiserror::Error;
use tracing::info;

/// Errors from cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("No catalog entry with id: {0}")]
    UnknownEntry(String),

    #[error("Invalid line: {0}")]
    InvalidLine(String),
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show lines, piece count and total
    Show,
    /// Add a catalog entry by id
    Add {
        id: String,
        #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
        quantity: f64,
    },
    /// Add a line that is not in the catalog
    AddLine {
        id: String,
        #[arg(short, long)]
        name: String,
        #[arg(short = 'p', long)]
        unit_price: f64,
        #[arg(short, long)]
        image_url: Option<String>,
        #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
        quantity: f64,
    },
    /// Set a line's quantity (clamped to 1..=999)
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: f64,
    },
    /// Grow a line
    Inc {
        id: String,
        #[arg(short, long, default_value_t = 1.0)]
        step: f64,
    },
    /// Shrink a line, never below one piece
    Dec {
        id: String,
        #[arg(short, long, default_value_t = 1.0)]
        step: f64,
    },
    /// Remove a line
    Remove { id: String },
    /// Empty the cart
    Clear,
}

/// Open the cart `cart_id` stored under `dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn open(dir: &Path, cart_id: &str) -> Result<CartStore<FileStorage>, CartCommandError> {
    let storage = FileStorage::open(dir)?;
    Ok(CartStore::open(storage, cart_key(&CartId::new(cart_id))))
}

/// Run `action` against the cart, then print it.
///
/// # Errors
///
/// Returns an error for unknown catalog ids, invalid lines, or storage
/// failures while opening.
pub fn run(dir: &Path, cart_id: &str, action: CartAction) -> Result<(), CartCommandError> {
    let mut cart = open(dir, cart_id)?;

    match action {
        CartAction::Show => {}
        CartAction::Add { id, quantity } => {
            let catalog = Catalog::builtin();
            let entry = catalog
                .find(&id)
                .ok_or(CartCommandError::UnknownEntry(id))?;
            cart.add(entry.to_line_item(), quantity);
        }
        CartAction::AddLine {
            id,
            name,
            unit_price,
            image_url,
            quantity,
        } => {
            if !unit_price.is_finite() || unit_price < 0.0 {
                return Err(CartCommandError::InvalidLine(format!(
                    "unit price must be a non-negative number, got {unit_price}"
                )));
            }
            let mut item = NewLineItem::new(id, name, unit_price);
            if let Some(url) = image_url {
                item = item.with_image(url);
            }
            cart.add(item, quantity);
        }
        CartAction::Set { id, quantity } => cart.set_quantity(&id, quantity),
        CartAction::Inc { id, step } => cart.increment(&id, step),
        CartAction::Dec { id, step } => cart.decrement(&id, step),
        CartAction::Remove { id } => cart.remove(&id),
        CartAction::Clear => cart.clear(),
    }

    report(&cart);
    Ok(())
}

fn report(cart: &CartStore<FileStorage>) {
    info!("Cart {}", cart.key());
    if cart.is_empty() {
        info!("  (empty)");
    }
    for line in cart.items() {
        info!(
            "  {:<10} {:<36} {:>3} x {:>9} = {:>10}",
            line.id,
            line.name,
            line.quantity,
            Price::from_amount(line.unit_price),
            Price::from_amount(line.line_total())
        );
    }
    info!(
        "Pieces: {}  Total: {}",
        cart.count(),
        Price::from_amount(cart.total())
    );
}
