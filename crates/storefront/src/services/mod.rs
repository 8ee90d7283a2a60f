//! Business logic services for the storefront.
//!
//! - `carts` - Session cart registry over the configured snapshot storage
//! - `email` - Contact mail composition and the [`email::MailProvider`] port
//! - `resend` - Resend HTTP API provider
//! - `smtp` - SMTP relay provider

pub mod carts;
pub mod email;
pub mod resend;
pub mod smtp;
