//! Checkout stub.
//!
//! No payment is taken. `GET` summarizes the cart; `POST` validates the buyer,
//! acknowledges the order with a reference and empties the cart.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use galeria_core::{Email, LineItem};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::routes::cart::current_cart;
use crate::state::AppState;

/// Flat shipping charge. Shipping is quoted separately for now.
pub const SHIPPING: f64 = 0.0;

/// Order summary shown before paying.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutSummary {
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
}

impl CheckoutSummary {
    fn new(items: Vec<LineItem>, subtotal: f64) -> Self {
        Self {
            items,
            subtotal,
            shipping: SHIPPING,
            total: subtotal + SHIPPING,
        }
    }
}

/// Buyer details.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuyerDetails {
    pub name: String,
    pub email: String,
}

/// Acknowledgment of a placed order.
#[derive(Debug, Serialize)]
pub struct OrderAck {
    pub ok: bool,
    pub reference: String,
    pub total: f64,
}

/// Short human-friendly order reference, e.g. `GAL-3F9A1C2B`.
fn order_reference() -> String {
    let id: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();
    format!("GAL-{}", id.to_uppercase())
}

/// Summarize the cart for checkout.
///
/// GET /api/checkout
#[instrument(skip(state, session))]
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutSummary>> {
    let Some(cart) = current_cart(&state, &session).await? else {
        return Ok(Json(CheckoutSummary::new(Vec::new(), 0.0)));
    };
    let cart = cart.lock().await;
    Ok(Json(CheckoutSummary::new(cart.items().to_vec(), cart.total())))
}

/// Place the order.
///
/// POST /api/checkout
#[instrument(skip(state, session, payload))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<BuyerDetails>, JsonRejection>,
) -> Result<Json<OrderAck>> {
    let Json(buyer) = payload?;

    if buyer.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required.".to_string()));
    }
    let email = Email::parse(&buyer.email)
        .map_err(|_| AppError::BadRequest("Enter a valid email address.".to_string()))?;

    let empty = || AppError::BadRequest("Your cart is empty.".to_string());
    let cart = current_cart(&state, &session).await?.ok_or_else(empty)?;
    let mut cart = cart.lock().await;
    if cart.is_empty() {
        return Err(empty());
    }

    let total = cart.total() + SHIPPING;
    let reference = order_reference();
    cart.clear();

    add_breadcrumb("checkout", "Order placed", &[("reference", reference.as_str())]);
    tracing::info!(
        reference = %reference,
        domain = %email.domain(),
        total,
        "Order placed"
    );

    Ok(Json(OrderAck {
        ok: true,
        reference,
        total,
    }))
}
