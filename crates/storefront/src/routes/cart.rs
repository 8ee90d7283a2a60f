//! Cart route handlers.
//!
//! The cart id lives in the session; the cart itself lives in the
//! [`CartRegistry`](crate::services::carts::CartRegistry). Reads never create a
//! session, mutations do. Every response carries the cart as it stands after
//! the operation.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use galeria_core::{CartId, CartStore, LineItem, NewLineItem, SnapshotStorage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::carts::SharedCart;
use crate::state::AppState;

/// Session key holding the shopper's cart id.
pub const CART_ID_KEY: &str = "cart_id";

/// Cart as returned by every cart endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub count: u64,
    pub total: f64,
}

impl CartView {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            total: 0.0,
        }
    }
}

impl<S: SnapshotStorage> From<&CartStore<S>> for CartView {
    fn from(cart: &CartStore<S>) -> Self {
        Self {
            items: cart.items().to_vec(),
            count: cart.count(),
            total: cart.total(),
        }
    }
}

/// `{count}` body.
#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: u64,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The session's cart, if it has one.
pub(crate) async fn current_cart(state: &AppState, session: &Session) -> Result<Option<SharedCart>> {
    let Some(id) = session.get::<CartId>(CART_ID_KEY).await? else {
        return Ok(None);
    };
    Ok(Some(state.carts().cart(&id).await))
}

/// The session's cart, assigning a fresh cart id on first use.
pub(crate) async fn session_cart(state: &AppState, session: &Session) -> Result<SharedCart> {
    let id = if let Some(id) = session.get::<CartId>(CART_ID_KEY).await? {
        id
    } else {
        let id = CartId::generate();
        session.insert(CART_ID_KEY, &id).await?;
        tracing::debug!(cart_id = %id, "Assigned cart to session");
        id
    };
    Ok(state.carts().cart(&id).await)
}

/// Read a quantity the way the cart expects it: numbers pass through, numeric
/// strings are parsed, anything else becomes NaN and is clamped to one.
fn coerce_quantity(value: Option<&Value>) -> f64 {
    match value {
        None | Some(Value::Null) => 1.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        Some(_) => f64::NAN,
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add a catalog entry by id.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    #[serde(default)]
    pub quantity: Option<Value>,
}

/// Add an arbitrary line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineRequest {
    pub id: String,
    pub name: String,
    pub unit_price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

/// Replace a line's quantity.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    #[serde(default)]
    pub quantity: Option<Value>,
}

/// `?step=` for increment and decrement. Missing or unparsable means one.
#[derive(Debug, Deserialize)]
pub struct StepQuery {
    pub step: Option<String>,
}

impl StepQuery {
    fn step(&self) -> f64 {
        self.step
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|s| s.is_finite())
            .unwrap_or(1.0)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
///
/// GET /api/cart
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let Some(cart) = current_cart(&state, &session).await? else {
        return Ok(Json(CartView::empty()));
    };
    let cart = cart.lock().await;
    Ok(Json(CartView::from(&*cart)))
}

/// Total pieces in the cart.
///
/// GET /api/cart/count
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CountView>> {
    let count = match current_cart(&state, &session).await? {
        Some(cart) => cart.lock().await.count(),
        None => 0,
    };
    Ok(Json(CountView { count }))
}

/// Add a catalog entry.
///
/// POST /api/cart/items
#[instrument(skip(state, session, payload))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(request) = payload?;

    let entry = state
        .catalog()
        .find(request.id.trim())
        .ok_or_else(|| AppError::NotFound(format!("catalog entry {}", request.id.trim())))?;
    let quantity = coerce_quantity(request.quantity.as_ref());

    let cart = session_cart(&state, &session).await?;
    let mut cart = cart.lock().await;
    cart.add(entry.to_line_item(), quantity);

    add_breadcrumb("cart", "Added catalog entry", &[("id", entry.id.as_str())]);
    tracing::info!(id = %entry.id, count = cart.count(), "Added to cart");

    Ok(Json(CartView::from(&*cart)))
}

/// Add a line that is not in the catalog.
///
/// POST /api/cart/lines
#[instrument(skip(state, session, payload))]
pub async fn add_line(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<AddLineRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(request) = payload?;

    let id = request.id.trim();
    let name = request.name.trim();
    if id.is_empty() || name.is_empty() {
        return Err(AppError::BadRequest("id and name are required".to_string()));
    }
    if !request.unit_price.is_finite() || request.unit_price < 0.0 {
        return Err(AppError::BadRequest(
            "unitPrice must be a non-negative number".to_string(),
        ));
    }

    let mut item = NewLineItem::new(id, name, request.unit_price);
    if let Some(url) = request.image_url.filter(|u| !u.trim().is_empty()) {
        item = item.with_image(url);
    }
    let quantity = coerce_quantity(request.quantity.as_ref());

    let cart = session_cart(&state, &session).await?;
    let mut cart = cart.lock().await;
    cart.add(item, quantity);

    add_breadcrumb("cart", "Added line", &[("id", id)]);
    Ok(Json(CartView::from(&*cart)))
}

/// Replace a line's quantity.
///
/// PUT /api/cart/items/{id}
#[instrument(skip(state, session, payload))]
pub async fn set_quantity(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    payload: std::result::Result<Json<SetQuantityRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Json(request) = payload?;
    let quantity = coerce_quantity(request.quantity.as_ref());

    let cart = session_cart(&state, &session).await?;
    let mut cart = cart.lock().await;
    cart.set_quantity(&id, quantity);

    add_breadcrumb("cart", "Set quantity", &[("id", id.as_str())]);
    Ok(Json(CartView::from(&*cart)))
}

/// Grow a line.
///
/// POST /api/cart/items/{id}/increment
#[instrument(skip(state, session))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<StepQuery>,
) -> Result<Json<CartView>> {
    let cart = session_cart(&state, &session).await?;
    let mut cart = cart.lock().await;
    cart.increment(&id, query.step());
    Ok(Json(CartView::from(&*cart)))
}

/// Shrink a line, never below one piece.
///
/// POST /api/cart/items/{id}/decrement
#[instrument(skip(state, session))]
pub async fn decrement(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<StepQuery>,
) -> Result<Json<CartView>> {
    let cart = session_cart(&state, &session).await?;
    let mut cart = cart.lock().await;
    cart.decrement(&id, query.step());
    Ok(Json(CartView::from(&*cart)))
}

/// Remove a line. Removing an absent id is not an error.
///
/// DELETE /api/cart/items/{id}
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let cart = session_cart(&state, &session).await?;
    let mut cart = cart.lock().await;
    cart.remove(&id);

    add_breadcrumb("cart", "Removed line", &[("id", id.as_str())]);
    Ok(Json(CartView::from(&*cart)))
}

/// Empty the cart.
///
/// DELETE /api/cart
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let Some(cart) = current_cart(&state, &session).await? else {
        return Ok(Json(CartView::empty()));
    };
    let mut cart = cart.lock().await;
    cart.clear();

    add_breadcrumb("cart", "Cleared cart", &[]);
    Ok(Json(CartView::from(&*cart)))
}
