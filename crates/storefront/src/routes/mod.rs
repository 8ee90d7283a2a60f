//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//!
//! # Catalog
//! GET    /api/catalog                     - Browse (category, q, tag, sort)
//! GET    /api/catalog/{id}                - Single entry
//! GET    /api/gallery                     - Artworks (technique)
//!
//! # Cart (session scoped)
//! GET    /api/cart                        - Items, count and total
//! DELETE /api/cart                        - Empty the cart
//! GET    /api/cart/count                  - Piece count
//! POST   /api/cart/items                  - Add catalog entry {id, quantity?}
//! POST   /api/cart/lines                  - Add arbitrary line
//! PUT    /api/cart/items/{id}             - Set quantity {quantity}
//! DELETE /api/cart/items/{id}             - Remove line
//! POST   /api/cart/items/{id}/increment   - Grow line (?step=)
//! POST   /api/cart/items/{id}/decrement   - Shrink line (?step=)
//!
//! # Rate limited
//! GET    /api/checkout                    - Order summary
//! POST   /api/checkout                    - Place order (stub)
//! POST   /api/contact                     - Contact form
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;

use std::time::Duration;

use axum::{
    Json, Router,
    http::{Request, Response, StatusCode},
    middleware,
    routing::{get, post, put},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::ErrorBody;
use crate::middleware::{
    checkout_rate_limiter, contact_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/catalog", get(catalog::list))
        .route("/api/catalog/{id}", get(catalog::show))
        .route("/api/gallery", get(catalog::gallery))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add_item))
        .route("/lines", post(cart::add_line))
        .route("/items/{id}", put(cart::set_quantity).delete(cart::remove))
        .route("/items/{id}/increment", post(cart::increment))
        .route("/items/{id}/decrement", post(cart::decrement))
}

/// Create the checkout routes router, rate limited per client.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/checkout",
            get(checkout::summary).post(checkout::place_order),
        )
        .layer(checkout_rate_limiter())
}

/// Create the contact routes router, rate limited per client.
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(contact::submit))
        .layer(contact_rate_limiter())
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/api/cart", cart_routes())
        .merge(checkout_routes())
        .merge(contact_routes())
}

/// The complete application: routes, middleware and state.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .fallback(not_found)
        .layer(session_layer)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}
