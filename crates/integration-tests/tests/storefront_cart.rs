//! Router tests for the session cart API.

use galeria_integration_tests::{TestApp, assert_money};
use serde_json::json;

fn ids(body: &serde_json::Value) -> Vec<&str> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_new_visitor_sees_empty_cart_without_session() {
    let mut app = TestApp::new();

    let resp = app.get("/api/cart").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({"items": [], "count": 0, "total": 0.0}));
    assert!(resp.headers.get("set-cookie").is_none());

    let resp = app.get("/api/cart/count").await;
    assert_eq!(resp.body, json!({"count": 0}));
    assert!(app.storage.is_empty());
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_lines_then_totals() {
    let mut app = TestApp::new();

    app.post(
        "/api/cart/lines",
        json!({"id": "a", "name": "A", "unitPrice": 10, "quantity": 2}),
    )
    .await;
    let resp = app
        .post(
            "/api/cart/lines",
            json!({"id": "b", "name": "B", "unitPrice": 5.5}),
        )
        .await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["count"], 3);
    assert_money(&resp.body["total"], 25.5);
    assert_eq!(ids(&resp.body), ["a", "b"]);
    assert_eq!(resp.body["items"][0]["unitPrice"], 10.0);
    assert!(resp.body["items"][0].get("imageUrl").is_none());
}

#[tokio::test]
async fn test_add_catalog_entry_by_id() {
    let mut app = TestApp::new();

    let resp = app
        .post("/api/cart/items", json!({"id": "obra-2", "quantity": 2}))
        .await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["items"][0]["name"], "Memoria de Agua");
    assert_eq!(resp.body["items"][0]["imageUrl"], "/images/obra-2.jpg");
    assert_money(&resp.body["total"], 760.0);
    assert!(resp.headers.get("set-cookie").is_some());
    assert_eq!(app.storage.len(), 1);
}

#[tokio::test]
async fn test_add_unknown_catalog_entry_is_404() {
    let mut app = TestApp::new();

    let resp = app.post("/api/cart/items", json!({"id": "p99"})).await;
    assert_eq!(resp.status, 404);
    assert!(resp.error().contains("p99"));
}

#[tokio::test]
async fn test_adding_same_id_merges_lines() {
    let mut app = TestApp::new();

    app.post("/api/cart/items", json!({"id": "p01", "quantity": 3}))
        .await;
    let resp = app
        .post("/api/cart/items", json!({"id": "p01", "quantity": 4}))
        .await;

    assert_eq!(resp.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(resp.body["items"][0]["quantity"], 7);
}

#[tokio::test]
async fn test_quantities_are_clamped_not_rejected() {
    let mut app = TestApp::new();

    let cases = [
        (json!(0), 1),
        (json!(-5), 1),
        (json!(2.9), 2),
        (json!(5000), 999),
        (json!("7"), 7),
        (json!("lots"), 1),
        (json!(null), 1),
    ];

    for (i, (quantity, expected)) in cases.into_iter().enumerate() {
        let id = format!("line-{i}");
        let resp = app
            .post(
                "/api/cart/lines",
                json!({"id": id.clone(), "name": "Line", "unitPrice": 1, "quantity": quantity.clone()}),
            )
            .await;
        assert_eq!(resp.status, 200);
        let line = resp.body["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|item| item["id"] == id.as_str())
            .unwrap();
        assert_eq!(line["quantity"], expected, "quantity input {quantity}");
    }
}

#[tokio::test]
async fn test_merge_clamps_at_upper_bound() {
    let mut app = TestApp::new();

    app.post("/api/cart/items", json!({"id": "p08", "quantity": 998}))
        .await;
    let resp = app
        .post("/api/cart/items", json!({"id": "p08", "quantity": 5}))
        .await;

    assert_eq!(resp.body["items"][0]["quantity"], 999);
}

#[tokio::test]
async fn test_add_line_rejects_bad_payloads() {
    let mut app = TestApp::new();

    let resp = app
        .post(
            "/api/cart/lines",
            json!({"id": " ", "name": "A", "unitPrice": 1}),
        )
        .await;
    assert_eq!(resp.status, 400);

    let resp = app
        .post(
            "/api/cart/lines",
            json!({"id": "a", "name": "A", "unitPrice": -1}),
        )
        .await;
    assert_eq!(resp.status, 400);
    assert!(resp.error().contains("unitPrice"));

    let resp = app
        .post("/api/cart/lines", json!({"id": "a", "name": "A"}))
        .await;
    assert_eq!(resp.status, 400);
    assert!(!resp.error().is_empty());
}

// =============================================================================
// Update / Remove / Clear
// =============================================================================

#[tokio::test]
async fn test_set_quantity() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "p03"})).await;

    let resp = app
        .put("/api/cart/items/p03", json!({"quantity": 5}))
        .await;
    assert_eq!(resp.body["items"][0]["quantity"], 5);

    let resp = app
        .put("/api/cart/items/p03", json!({"quantity": 0}))
        .await;
    assert_eq!(resp.body["items"][0]["quantity"], 1);

    let resp = app
        .put("/api/cart/items/p03", json!({"quantity": 10_000}))
        .await;
    assert_eq!(resp.body["items"][0]["quantity"], 999);
}

#[tokio::test]
async fn test_set_quantity_on_absent_id_is_noop() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "p03"})).await;

    let resp = app
        .put("/api/cart/items/nope", json!({"quantity": 5}))
        .await;
    assert_eq!(resp.status, 200);
    assert_eq!(ids(&resp.body), ["p03"]);
    assert_eq!(resp.body["count"], 1);
}

#[tokio::test]
async fn test_increment_and_decrement() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "p05", "quantity": 2}))
        .await;

    let resp = app.post_empty("/api/cart/items/p05/increment").await;
    assert_eq!(resp.body["items"][0]["quantity"], 3);

    let resp = app
        .post_empty("/api/cart/items/p05/increment?step=10")
        .await;
    assert_eq!(resp.body["items"][0]["quantity"], 13);

    let resp = app
        .post_empty("/api/cart/items/p05/decrement?step=100")
        .await;
    assert_eq!(resp.body["items"][0]["quantity"], 1);

    let resp = app.post_empty("/api/cart/items/p05/decrement").await;
    assert_eq!(resp.body["items"][0]["quantity"], 1);
    assert_eq!(ids(&resp.body), ["p05"]);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "p01"})).await;
    app.post("/api/cart/items", json!({"id": "p02"})).await;

    let first = app.delete("/api/cart/items/p01").await;
    let second = app.delete("/api/cart/items/p01").await;

    assert_eq!(first.status, 200);
    assert_eq!(second.status, 200);
    assert_eq!(first.body, second.body);
    assert_eq!(ids(&second.body), ["p02"]);
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "p06", "quantity": 2}))
        .await;

    assert_eq!(app.storage.len(), 1);

    let resp = app.delete("/api/cart").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({"items": [], "count": 0, "total": 0.0}));
    assert!(app.storage.is_empty());

    let resp = app.get("/api/cart/count").await;
    assert_eq!(resp.body["count"], 0);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_cart_follows_session_cookie() {
    let mut app = TestApp::new();
    app.post("/api/cart/items", json!({"id": "p07"})).await;

    let resp = app.get("/api/cart").await;
    assert_eq!(resp.body["count"], 1);

    app.forget_session();
    let resp = app.get("/api/cart").await;
    assert_eq!(resp.body["count"], 0);
}

#[tokio::test]
async fn test_malformed_json_is_400_with_error_body() {
    let mut app = TestApp::new();

    let resp = app
        .send_raw(
            axum::http::Method::POST,
            "/api/cart/items",
            Some("application/json"),
            "{not json",
        )
        .await;
    assert_eq!(resp.status, 400);
    assert!(!resp.error().is_empty());
}
