//! Test harness for the Galeria storefront.
//!
//! Router tests drive the real [`galeria_storefront::app`] in-process with
//! `tower::ServiceExt::oneshot`, backed by `MemoryStorage` and a recording
//! mail provider. [`TestApp`] carries the session cookie between calls the
//! way a browser would.
//!
//! Live-server tests (`storefront_live.rs`) are `#[ignore]`d and talk to a
//! running storefront over HTTP:
//!
//! ```bash
//! cargo run -p galeria-storefront &
//! cargo test -p galeria-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use galeria_core::{MemoryStorage, SnapshotStorage};
use galeria_storefront::services::email::{MailError, MailProvider, OutgoingMail, SharedMailer};
use galeria_storefront::{AppState, Catalog, StorefrontConfig, app};
use serde_json::Value;
use tower::ServiceExt;

/// Client address sent on every request so the rate limiters can key on it.
pub const TEST_CLIENT_IP: &str = "203.0.113.10";

// =============================================================================
// Mail Doubles
// =============================================================================

/// Mail provider that keeps every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailProvider for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Mail provider that always fails.
#[derive(Debug)]
pub enum FailingMailer {
    /// Provider answered with an error message.
    Rejects { status: u16, message: String },
    /// Transport failed without a provider message.
    Unreachable,
}

#[async_trait]
impl MailProvider for FailingMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
        Err(match self {
            Self::Rejects { status, message } => MailError::Rejected {
                status: *status,
                message: message.clone(),
            },
            Self::Unreachable => MailError::Smtp("connection refused".to_string()),
        })
    }
}

// =============================================================================
// Test App
// =============================================================================

/// Response with the body decoded as JSON (`Value::Null` when empty,
/// `Value::String` when not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `error` field of an error body.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// In-process storefront with a cookie jar of one.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub storage: Arc<MemoryStorage>,
    pub mailer: Arc<RecordingMailer>,
}

/// Default configuration: no environment variables at all.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::from_lookup(|_| None).unwrap()
}

impl TestApp {
    /// Storefront with memory storage and a recording mailer.
    #[must_use]
    pub fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let shared: SharedMailer = mailer.clone();
        Self::build(Some(shared), mailer)
    }

    /// Storefront with the given mail provider (or none).
    #[must_use]
    pub fn with_mailer(mailer: Option<SharedMailer>) -> Self {
        Self::build(mailer, Arc::new(RecordingMailer::default()))
    }

    fn build(mailer: Option<SharedMailer>, recording: Arc<RecordingMailer>) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let shared: Arc<dyn SnapshotStorage> = storage.clone();
        let state = AppState::new(test_config(), Catalog::builtin(), shared, mailer);

        Self {
            router: app(state),
            cookie: None,
            storage,
            mailer: recording,
        }
    }

    /// Storefront over an existing state, e.g. one using `FileStorage`.
    #[must_use]
    pub fn from_state(state: AppState) -> Self {
        Self {
            router: app(state),
            cookie: None,
            storage: Arc::new(MemoryStorage::new()),
            mailer: Arc::new(RecordingMailer::default()),
        }
    }

    /// Forget the session cookie, as a new browser would.
    pub fn forget_session(&mut self) {
        self.cookie = None;
    }

    /// Send a request with a raw body.
    pub async fn send_raw(
        &mut self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> TestResponse {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", TEST_CLIENT_IP);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body.into()).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(set_cookie.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a request with an optional JSON body.
    pub async fn send(&mut self, method: Method, uri: &str, json: Option<Value>) -> TestResponse {
        match json {
            Some(json) => {
                self.send_raw(method, uri, Some("application/json"), json.to_string())
                    .await
            }
            None => self.send_raw(method, uri, None, Body::empty()).await,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, json: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(json)).await
    }

    pub async fn post_empty(&mut self, uri: &str) -> TestResponse {
        self.send(Method::POST, uri, None).await
    }

    pub async fn put(&mut self, uri: &str, json: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(json)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert two money amounts are equal to the cent.
pub fn assert_money(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {expected}, got {actual}"
    );
}
