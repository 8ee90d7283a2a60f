//! Resend API client for transactional email.
//!
//! Sends a single email per call through `POST /emails`. Resend reports
//! failures as JSON (`{"statusCode": 422, "message": "...", "name": "..."}`);
//! the `message` is surfaced so callers can echo it.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::services::email::{MailError, MailProvider, OutgoingMail};

/// Resend API base URL.
const BASE_URL: &str = "https://api.resend.com";

/// Resend API client.
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    base_url: String,
}

/// Request body for `POST /emails`.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Error body returned by Resend.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Successful response body.
#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

impl ResendClient {
    /// Create a new Resend client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(api_key: &SecretString) -> Result<Self, MailError> {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a client against a different API host (e.g. a local mock).
    ///
    /// # Errors
    ///
    /// Same as [`ResendClient::new`].
    pub fn with_base_url(api_key: &SecretString, base_url: &str) -> Result<Self, MailError> {
        let mut headers = HeaderMap::new();

        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret())).map_err(|e| {
                MailError::Rejected {
                    status: 0,
                    message: format!("Invalid API key format: {e}"),
                }
            })?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MailProvider for ResendClient {
    #[instrument(skip(self, mail), fields(to = %mail.to, subject = %mail.subject))]
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let url = format!("{}/emails", self.base_url);
        let body = SendEmailRequest {
            from: &mail.from,
            to: [&mail.to],
            reply_to: mail.reply_to.as_deref(),
            subject: &mail.subject,
            html: &mail.html,
            text: &mail.text,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&raw)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(raw);
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<SendEmailResponse>().await {
            Ok(sent) => tracing::info!(email_id = %sent.id, "Email accepted by Resend"),
            Err(e) => tracing::debug!(error = %e, "Resend accepted email without an id"),
        }

        Ok(())
    }
}
