//! Contact form commands.
//!
//! `check` runs the endpoint's validation locally; `send` delivers a test
//! message through the provider configured in the environment
//! (`RESEND_API_KEY` or `SMTP_*`).

use galeria_storefront::StorefrontConfig;
use galeria_storefront::config::ConfigError;
use galeria_storefront::routes::contact::{ContactError, ContactSubmission, ValidatedContact};
use galeria_storefront::services::email::{MailError, compose_contact_mail, mailer_from_config};
use thiserror::Error;
use tracing::info;

/// Errors from contact commands.
#[derive(Debug, Error)]
pub enum ContactCommandError {
    #[error("{0}")]
    Invalid(#[from] ContactError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No mail provider configured (set RESEND_API_KEY or SMTP_HOST)")]
    NoProvider,

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

/// Validate a submission without sending it.
///
/// # Errors
///
/// Returns the validation error the endpoint would answer with.
pub fn check(name: String, email: String, message: String) -> Result<ValidatedContact, ContactCommandError> {
    let contact = ContactSubmission {
        name,
        email,
        message,
    }
    .validate()?;
    info!(name = %contact.name, email = %contact.email, "Submission is valid");
    Ok(contact)
}

/// Validate and send a contact message.
///
/// # Errors
///
/// Returns an error if validation fails, configuration is missing or the
/// provider rejects the message.
pub async fn send(name: String, email: String, message: String) -> Result<(), ContactCommandError> {
    let contact = check(name, email, message)?;

    let config = StorefrontConfig::from_env()?;
    let mailer = mailer_from_config(&config.mail)?.ok_or(ContactCommandError::NoProvider)?;

    let mail = compose_contact_mail(
        &config.mail,
        &contact.name,
        contact.email.as_str(),
        &contact.message,
    )?;
    info!(to = %mail.to, subject = %mail.subject, "Sending contact message");
    mailer.send(&mail).await?;

    info!("Sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_valid_submission() {
        let contact = check("Ana".into(), "a@b.com".into(), "hola".into());
        assert!(contact.is_ok());
    }

    #[test]
    fn test_check_reports_email_problem() {
        let err = check("Ana".into(), "bad".into(), "hola".into()).err();
        assert!(matches!(
            err,
            Some(ContactCommandError::Invalid(ContactError::Validation(msg))) if msg.contains("email")
        ));
    }
}
