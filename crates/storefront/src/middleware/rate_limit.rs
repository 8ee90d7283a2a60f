//! Per-client rate limiting using governor and `tower_governor`.
//!
//! Only the routes that reach the outside world are limited:
//! - `contact_rate_limiter`: contact form, ~5 messages per minute per IP
//! - `checkout_rate_limiter`: checkout, ~10 requests per minute per IP

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Json;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::ErrorBody;

/// Forwarding headers consulted for the client address, most trusted first.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Key extractor for the real client IP.
///
/// Reads proxy headers first (the first hop of `X-Forwarded-For`), then the
/// peer address when the server was started with connect info.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        CLIENT_IP_HEADERS
            .iter()
            .find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.split(',').next())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Render a governor rejection as a JSON `{error}` body, keeping the
/// `retry-after` and `x-ratelimit-*` headers.
fn rejection_response(error: GovernorError) -> Response {
    let (status, headers, message) = match error {
        GovernorError::TooManyRequests { wait_time, headers } => (
            StatusCode::TOO_MANY_REQUESTS,
            headers.unwrap_or_default(),
            format!("Too many requests. Try again in {wait_time}s."),
        ),
        GovernorError::UnableToExtractKey => {
            tracing::warn!("Rate limiter could not determine the client address");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HeaderMap::new(),
                "Unexpected error.".to_string(),
            )
        }
        GovernorError::Other { code, msg, headers } => (
            code,
            headers.unwrap_or_default(),
            msg.unwrap_or_else(|| "Request rejected.".to_string()),
        ),
    };
    (status, headers, Json(ErrorBody::new(message))).into_response()
}

/// Create rate limiter for the contact form: one message every 12 seconds,
/// burst of 3.
///
/// # Panics
///
/// Never panics: `per_second(12)` and `burst_size(3)` are valid positive
/// values for `GovernorConfigBuilder`.
#[must_use]
pub fn contact_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(12)
        .burst_size(3)
        .finish()
        .expect("rate limiter config with per_second(12) and burst_size(3) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(rejection_response)
}

/// Create rate limiter for checkout: one request every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never panics: `per_second(6)` and `burst_size(5)` are valid positive
/// values for `GovernorConfigBuilder`.
#[must_use]
pub fn checkout_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(rejection_response)
}
