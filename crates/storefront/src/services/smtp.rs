//! SMTP mail provider via lettre.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::SmtpConfig;
use crate::services::email::{MailError, MailProvider, OutgoingMail};

/// Mail provider backed by a STARTTLS SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// No connection is made until the first send.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self { mailer })
    }
}

/// Build a multipart (text + HTML) message.
fn build_message(mail: &OutgoingMail) -> Result<Message, MailError> {
    let parse = |addr: &str| {
        addr.parse()
            .map_err(|_| MailError::InvalidAddress(addr.to_string()))
    };

    let mut builder = Message::builder()
        .from(parse(&mail.from)?)
        .to(parse(&mail.to)?)
        .subject(mail.subject.clone());

    if let Some(reply_to) = &mail.reply_to {
        builder = builder.reply_to(parse(reply_to)?);
    }

    builder
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(mail.text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(mail.html.clone()),
                ),
        )
        .map_err(|e| MailError::Smtp(e.to_string()))
}

#[async_trait]
impl MailProvider for SmtpMailer {
    #[instrument(skip(self, mail), fields(to = %mail.to, subject = %mail.subject))]
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(mail)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        tracing::info!("Email sent via SMTP");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "Galeria <studio@galeria.example>".to_string(),
            to: "artist@galeria.example".to_string(),
            reply_to: Some("ana@galeria.art".to_string()),
            subject: "New message — Ana".to_string(),
            html: "<p>Hola</p>".to_string(),
            text: "Hola".to_string(),
        }
    }

    #[test]
    fn test_build_message() {
        assert!(build_message(&mail()).is_ok());
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let mut bad = mail();
        bad.to = "not an address".to_string();
        assert!(matches!(
            build_message(&bad),
            Err(MailError::InvalidAddress(addr)) if addr == "not an address"
        ));
    }
}
