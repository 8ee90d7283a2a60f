//! Live-server tests for the storefront.
//!
//! These tests require the storefront running locally
//! (`cargo run -p galeria-storefront`). Set `STOREFRONT_BASE_URL` to point
//! them elsewhere.
//!
//! Run with: cargo test -p galeria-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront (configurable via environment).
fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Client that keeps the session cookie, like a browser.
fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_live_health() {
    let resp = browser()
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_live_cart_session_round_trip() {
    let client = browser();
    let base_url = storefront_base_url();
    let line_id = format!("live-{}", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/api/cart/lines"))
        .json(&json!({"id": line_id, "name": "Live test", "unitPrice": 1.25, "quantity": 4}))
        .send()
        .await
        .expect("Failed to add line");
    assert_eq!(resp.status(), StatusCode::OK);

    let cart: Value = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Cart body is not JSON");
    assert_eq!(cart["count"], 4);
    assert!((cart["total"].as_f64().unwrap_or_default() - 5.0).abs() < 0.005);

    let resp = client
        .delete(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_live_contact_validation() {
    let resp = browser()
        .post(format!("{}/api/contact", storefront_base_url()))
        .json(&json!({"name": "A", "email": "bad", "message": "hello"}))
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Error body is not JSON");
    assert!(body["error"].is_string());
}
