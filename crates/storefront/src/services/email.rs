//! Transactional email for contact messages.
//!
//! The contact endpoint hands an [`OutgoingMail`] to whichever
//! [`MailProvider`] the storefront was configured with: Resend over HTTPS or
//! an SMTP relay. Bodies are rendered from Askama templates, so user input is
//! HTML-escaped in the HTML part.

use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::{MailConfig, MailProviderConfig};
use crate::services::resend::ResendClient;
use crate::services::smtp::SmtpMailer;

/// HTML template for a contact message.
#[derive(Template)]
#[template(path = "email/contact_message.html")]
struct ContactMessageHtml<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

/// Plain text template for a contact message.
#[derive(Template)]
#[template(path = "email/contact_message.txt")]
struct ContactMessageText<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// The provider answered but refused the message.
    #[error("Provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Could not reach the provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SMTP transport or message error.
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl MailError {
    /// Message reported by the provider itself, if it gave one.
    #[must_use]
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// A fully composed email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// A transactional email backend.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Deliver `mail`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects or cannot be reached.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Shared handle to the configured provider.
pub type SharedMailer = Arc<dyn MailProvider>;

/// Build the provider named in `config`, if any.
///
/// # Errors
///
/// Returns an error if the provider client cannot be constructed.
pub fn mailer_from_config(config: &MailConfig) -> Result<Option<SharedMailer>, MailError> {
    let mailer: SharedMailer = match &config.provider {
        None => return Ok(None),
        Some(MailProviderConfig::Resend { api_key }) => Arc::new(ResendClient::new(api_key)?),
        Some(MailProviderConfig::Smtp(smtp)) => Arc::new(SmtpMailer::new(smtp)?),
    };
    Ok(Some(mailer))
}

/// Compose the notification for a contact form submission.
///
/// `name`, `email` and `message` are expected to be validated and trimmed.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn compose_contact_mail(
    config: &MailConfig,
    name: &str,
    email: &str,
    message: &str,
) -> Result<OutgoingMail, MailError> {
    let html = ContactMessageHtml {
        name,
        email,
        message,
    }
    .render()?;
    let text = ContactMessageText {
        name,
        email,
        message,
    }
    .render()?;

    Ok(OutgoingMail {
        from: config.from.clone(),
        to: config.to.clone(),
        reply_to: Some(email.to_string()),
        subject: format!("New message — {name}"),
        html,
        text,
    })
}
