//! Contact form endpoint.
//!
//! `POST /api/contact` validates `{name, email, message}`, renders the
//! notification and hands it to the configured mail provider.
//!
//! | outcome | status | body |
//! |---|---|---|
//! | sent | 200 | `{"ok": true}` |
//! | invalid field or body | 400 | `{"error": ...}` |
//! | no provider configured | 500 | `{"error": ...}` |
//! | provider failed | 500 | `{"error": <provider message>}` |
//! | anything else | 500 | `{"error": ...}` |

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use galeria_core::Email;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::error::ErrorBody;
use crate::services::email::{MailError, compose_contact_mail};
use crate::state::AppState;

/// Name length bounds, in characters after trimming.
pub const NAME_LEN: (usize, usize) = (2, 80);
/// Message length bounds, in characters after trimming.
pub const MESSAGE_LEN: (usize, usize) = (2, 4000);

const NAME_ERROR: &str = "Name must be between 2 and 80 characters.";
const EMAIL_ERROR: &str = "Enter a valid email address.";
const MESSAGE_ERROR: &str = "Message must be between 2 and 4000 characters.";

/// Errors surfaced by the contact endpoint.
#[derive(Debug, Error)]
pub enum ContactError {
    /// One or more fields failed validation, or the body was not JSON.
    #[error("{0}")]
    Validation(String),

    /// No mail provider credential is configured.
    #[error("mail provider is not configured")]
    Configuration,

    /// The provider rejected or failed the send.
    #[error("mail provider error: {0}")]
    Provider(MailError),

    /// Anything else.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ContactError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Configuration | Self::Provider(_) | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text for the `error` field of the response body.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Configuration => "Email service is not configured.".to_string(),
            Self::Provider(e) => e
                .provider_message()
                .unwrap_or("Could not send the message.")
                .to_string(),
            Self::Unexpected(_) => "Unexpected error.".to_string(),
        }
    }
}

impl From<JsonRejection> for ContactError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Contact message not sent");
        } else {
            tracing::info!(error = %self, "Contact submission rejected");
        }
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

/// Contact form body. Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// A submission that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact {
    pub name: String,
    pub email: Email,
    pub message: String,
}

fn within(s: &str, (min, max): (usize, usize)) -> bool {
    (min..=max).contains(&s.chars().count())
}

impl ContactSubmission {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Validation`] naming every failing field, in
    /// name, email, message order.
    pub fn validate(&self) -> Result<ValidatedContact, ContactError> {
        let name = self.name.trim();
        let message = self.message.trim();
        let email = Email::parse(&self.email);

        let mut problems = Vec::new();
        if !within(name, NAME_LEN) {
            problems.push(NAME_ERROR);
        }
        if email.is_err() {
            problems.push(EMAIL_ERROR);
        }
        if !within(message, MESSAGE_LEN) {
            problems.push(MESSAGE_ERROR);
        }

        match email {
            Ok(email) if problems.is_empty() => Ok(ValidatedContact {
                name: name.to_string(),
                email,
                message: message.to_string(),
            }),
            _ => Err(ContactError::Validation(problems.join(" "))),
        }
    }
}

/// `{"ok": true}`.
#[derive(Debug, Serialize)]
pub struct ContactAck {
    pub ok: bool,
}

/// Send a contact message.
///
/// POST /api/contact
#[instrument(skip(state, payload))]
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<ContactAck>, ContactError> {
    let Json(submission) = payload?;
    let contact = submission.validate()?;

    let mailer = state.mailer().ok_or(ContactError::Configuration)?;

    let mail = compose_contact_mail(
        &state.config().mail,
        &contact.name,
        contact.email.as_str(),
        &contact.message,
    )
    .map_err(|e| ContactError::Unexpected(e.to_string()))?;

    mailer.send(&mail).await.map_err(ContactError::Provider)?;

    tracing::info!(domain = %contact.email.domain(), "Contact message sent");
    Ok(Json(ContactAck { ok: true }))
}
