//! Router tests for the contact endpoint.

use std::sync::Arc;

use axum::http::Method;
use galeria_integration_tests::{FailingMailer, TestApp};
use galeria_storefront::services::email::SharedMailer;
use serde_json::json;

#[tokio::test]
async fn test_valid_message_is_sent() {
    let mut app = TestApp::new();

    let resp = app
        .post(
            "/api/contact",
            json!({"name": "Ana", "email": "a@b.com", "message": "hi"}),
        )
        .await;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({"ok": true}));

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "New message — Ana");
    assert_eq!(sent[0].reply_to.as_deref(), Some("a@b.com"));
    assert_eq!(sent[0].to, "studio@galeria.example");
    assert!(sent[0].text.contains("hi"));
}

#[tokio::test]
async fn test_invalid_email_is_400() {
    let mut app = TestApp::new();

    let resp = app
        .post(
            "/api/contact",
            json!({"name": "A", "email": "bad", "message": "hello"}),
        )
        .await;

    assert_eq!(resp.status, 400);
    assert!(resp.error().to_lowercase().contains("email"));
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_email_with_surrounding_space_is_400() {
    let mut app = TestApp::new();

    let resp = app
        .post(
            "/api/contact",
            json!({"name": "Ana", "email": " a@b.com", "message": "hello"}),
        )
        .await;

    assert_eq!(resp.status, 400);
    assert_eq!(resp.error(), "Enter a valid email address.");
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_missing_fields_count_as_empty() {
    let mut app = TestApp::new();

    let resp = app.post("/api/contact", json!({})).await;
    assert_eq!(resp.status, 400);
    assert!(resp.error().contains("Name"));
    assert!(resp.error().contains("Message"));
}

#[tokio::test]
async fn test_user_input_is_escaped_in_html_part() {
    let mut app = TestApp::new();

    app.post(
        "/api/contact",
        json!({
            "name": "<b>Eve</b>",
            "email": "eve@example.com",
            "message": "<script>alert(1)</script>"
        }),
    )
    .await;

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].html.contains("<script>"));
    assert!(sent[0].html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_missing_provider_is_500() {
    let mut app = TestApp::with_mailer(None);

    let resp = app
        .post(
            "/api/contact",
            json!({"name": "Ana", "email": "a@b.com", "message": "hi"}),
        )
        .await;

    assert_eq!(resp.status, 500);
    assert!(!resp.error().is_empty());
}

#[tokio::test]
async fn test_provider_message_is_echoed() {
    let mailer: SharedMailer = Arc::new(FailingMailer::Rejects {
        status: 403,
        message: "The galeria.example domain is not verified.".to_string(),
    });
    let mut app = TestApp::with_mailer(Some(mailer));

    let resp = app
        .post(
            "/api/contact",
            json!({"name": "Ana", "email": "a@b.com", "message": "hi"}),
        )
        .await;

    assert_eq!(resp.status, 500);
    assert_eq!(resp.error(), "The galeria.example domain is not verified.");
}

#[tokio::test]
async fn test_transport_failure_is_generic_500() {
    let mailer: SharedMailer = Arc::new(FailingMailer::Unreachable);
    let mut app = TestApp::with_mailer(Some(mailer));

    let resp = app
        .post(
            "/api/contact",
            json!({"name": "Ana", "email": "a@b.com", "message": "hi"}),
        )
        .await;

    assert_eq!(resp.status, 500);
    assert_eq!(resp.error(), "Could not send the message.");
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let mut app = TestApp::new();

    let resp = app
        .send_raw(
            Method::POST,
            "/api/contact",
            Some("application/json"),
            "name=Ana",
        )
        .await;

    assert_eq!(resp.status, 400);
    assert!(resp.body["error"].is_string());
}

#[tokio::test]
async fn test_contact_is_rate_limited() {
    let mut app = TestApp::new();
    let body = json!({"name": "Ana", "email": "a@b.com", "message": "hi"});

    let mut responses = Vec::new();
    for _ in 0..5 {
        responses.push(app.post("/api/contact", body.clone()).await);
    }

    assert_eq!(responses[0].status, 200);
    let limited = responses
        .iter()
        .find(|r| r.status == 429)
        .expect("a 429 within five posts");
    assert!(limited.body["error"].is_string());
    assert!(limited.headers.contains_key("retry-after"));
    assert_eq!(limited.headers["content-type"], "application/json");
}
