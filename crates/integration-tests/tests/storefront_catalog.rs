//! Router tests for catalog and gallery browsing.

use galeria_integration_tests::TestApp;
use serde_json::Value;

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();
    let resp = app.get("/health").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_catalog_relevance_lists_featured_first() {
    let mut app = TestApp::new();

    let resp = app.get("/api/catalog").await;
    assert_eq!(resp.status, 200);
    let list = ids(&resp.body);
    assert_eq!(list.len(), 14);
    assert_eq!(&list[..3], ["p01", "p03", "p07"]);
}

#[tokio::test]
async fn test_catalog_filters_and_sorts() {
    let mut app = TestApp::new();

    let resp = app.get("/api/catalog?category=posters").await;
    assert_eq!(ids(&resp.body), ["p07"]);

    let resp = app.get("/api/catalog?category=artwork&sort=price-asc").await;
    assert_eq!(
        ids(&resp.body),
        ["obra-5", "obra-6", "obra-2", "obra-4", "obra-1", "obra-3"]
    );

    let resp = app.get("/api/catalog?q=taza").await;
    assert_eq!(ids(&resp.body), ["p05"]);

    let resp = app.get("/api/catalog?tag=2024&sort=price-desc").await;
    assert_eq!(ids(&resp.body), ["obra-1", "obra-4"]);
}

#[tokio::test]
async fn test_catalog_newest_is_stable() {
    let mut app = TestApp::new();

    let resp = app.get("/api/catalog?sort=newest").await;
    assert_eq!(&ids(&resp.body)[..3], ["p01", "p05", "obra-1"]);
}

#[tokio::test]
async fn test_catalog_rejects_unknown_keys() {
    let mut app = TestApp::new();

    let resp = app.get("/api/catalog?category=hats").await;
    assert_eq!(resp.status, 400);
    assert!(resp.error().contains("hats"));

    let resp = app.get("/api/catalog?sort=random").await;
    assert_eq!(resp.status, 400);
}

#[tokio::test]
async fn test_catalog_entry() {
    let mut app = TestApp::new();

    let resp = app.get("/api/catalog/obra-3").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["title"], "Campos Invisibles");
    assert_eq!(resp.body["unitPrice"], 520.0);
    assert_eq!(resp.body["category"], "artwork");

    let resp = app.get("/api/catalog/nope").await;
    assert_eq!(resp.status, 404);
    assert!(resp.body["error"].is_string());
}

#[tokio::test]
async fn test_gallery_by_technique() {
    let mut app = TestApp::new();

    let resp = app.get("/api/gallery").await;
    assert_eq!(ids(&resp.body).len(), 6);

    let resp = app.get("/api/gallery?technique=ink").await;
    assert_eq!(ids(&resp.body), ["obra-5"]);

    let resp = app.get("/api/gallery?technique=").await;
    assert_eq!(ids(&resp.body).len(), 6);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let mut app = TestApp::new();

    let resp = app.get("/api/nothing-here").await;
    assert_eq!(resp.status, 404);
    assert_eq!(resp.error(), "Not found");
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let mut app = TestApp::new();

    let resp = app.get("/api/catalog").await;
    assert!(resp.headers.contains_key("x-request-id"));
    assert_eq!(resp.headers["x-content-type-options"], "nosniff");
    assert_eq!(resp.headers["x-frame-options"], "DENY");
}
