//! Router tests for the checkout stub.

use galeria_integration_tests::{TestApp, assert_money};
use serde_json::json;

#[tokio::test]
async fn test_summary_of_empty_cart() {
    let mut app = TestApp::new();

    let resp = app.get("/api/checkout").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["items"], json!([]));
    assert_money(&resp.body["subtotal"], 0.0);
    assert_money(&resp.body["total"], 0.0);
}

#[tokio::test]
async fn test_summary_matches_cart() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "obra-1"})).await;
    app.post("/api/cart/items", json!({"id": "obra-5", "quantity": 2}))
        .await;

    let resp = app.get("/api/checkout").await;
    assert_eq!(resp.body["items"].as_array().unwrap().len(), 2);
    assert_money(&resp.body["subtotal"], 970.0);
    assert_money(&resp.body["shipping"], 0.0);
    assert_money(&resp.body["total"], 970.0);
}

#[tokio::test]
async fn test_place_order_clears_cart() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "p03", "quantity": 2}))
        .await;

    let resp = app
        .post(
            "/api/checkout",
            json!({"name": "Ana", "email": "ana@galeria.art"}),
        )
        .await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["ok"], true);
    assert!(resp.body["reference"].as_str().unwrap().starts_with("GAL-"));
    assert_money(&resp.body["total"], 360.0);
    assert!(app.storage.is_empty());

    let resp = app.get("/api/cart").await;
    assert_eq!(resp.body["count"], 0);
}

#[tokio::test]
async fn test_place_order_validates_buyer() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "p03"})).await;

    let resp = app
        .post("/api/checkout", json!({"name": " ", "email": "ana@galeria.art"}))
        .await;
    assert_eq!(resp.status, 400);

    let resp = app
        .post("/api/checkout", json!({"name": "Ana", "email": "ana@galeria"}))
        .await;
    assert_eq!(resp.status, 400);
    assert!(resp.error().contains("email"));

    let resp = app.get("/api/cart").await;
    assert_eq!(resp.body["count"], 1);
}

#[tokio::test]
async fn test_place_order_with_empty_cart() {
    let mut app = TestApp::new();

    let resp = app
        .post("/api/checkout", json!({"name": "Ana", "email": "ana@galeria.art"}))
        .await;
    assert_eq!(resp.status, 400);
    assert_eq!(resp.error(), "Your cart is empty.");
}
