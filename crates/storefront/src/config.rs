//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the storefront boots with in-memory carts and
//! no mail provider when nothing is set.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: http://localhost:3000)
//! - `CART_STORAGE_DIR` - Directory for durable cart snapshots (default: in-memory)
//! - `RESEND_API_KEY` - Resend API key; selects the Resend mail provider
//! - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USERNAME` / `SMTP_PASSWORD` - SMTP relay,
//!   used when no Resend key is set
//! - `MAIL_FROM` - Sender (default: `Galeria <onboarding@resend.dev>`)
//! - `MAIL_TO` - Recipient of contact messages (falls back to `TEST_TO`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_MAIL_FROM: &str = "Galeria <onboarding@resend.dev>";
const DEFAULT_MAIL_TO: &str = "studio@galeria.example";
const DEFAULT_SMTP_PORT: u16 = 587;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Where cart snapshots are written; `None` keeps them in memory
    pub cart_storage_dir: Option<PathBuf>,
    /// Contact mail settings
    pub mail: MailConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Where contact messages go and how they are sent.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from: String,
    pub to: String,
    /// `None` means the contact endpoint answers with a configuration error.
    pub provider: Option<MailProviderConfig>,
}

/// Transactional email provider credentials.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub enum MailProviderConfig {
    Resend { api_key: SecretString },
    Smtp(SmtpConfig),
}

/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for MailProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resend { .. } => f
                .debug_struct("Resend")
                .field("api_key", &"[REDACTED]")
                .finish(),
            Self::Smtp(smtp) => f.debug_tuple("Smtp").field(smtp).finish(),
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or a secret fails
    /// validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("STOREFRONT_HOST", "127.0.0.1".parse().ok())?;
        let port = env.parse_or("STOREFRONT_PORT", Some(3000))?;
        let base_url = env.parse_or(
            "STOREFRONT_BASE_URL",
            Url::parse("http://localhost:3000").ok(),
        )?;
        let cart_storage_dir = env.optional("CART_STORAGE_DIR").map(PathBuf::from);
        let mail = MailConfig::from_env(&env)?;

        Ok(Self {
            host,
            port,
            base_url,
            cart_storage_dir,
            mail,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl MailConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let from = env
            .optional("MAIL_FROM")
            .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());
        let to = env
            .optional("MAIL_TO")
            .or_else(|| env.optional("TEST_TO"))
            .unwrap_or_else(|| DEFAULT_MAIL_TO.to_string());

        let provider = if let Some(api_key) = env.optional("RESEND_API_KEY") {
            validate_secret_strength(&api_key, "RESEND_API_KEY")?;
            Some(MailProviderConfig::Resend {
                api_key: SecretString::from(api_key),
            })
        } else if let Some(host) = env.optional("SMTP_HOST") {
            Some(MailProviderConfig::Smtp(SmtpConfig {
                host,
                port: env.parse_or("SMTP_PORT", Some(DEFAULT_SMTP_PORT))?,
                username: env.required("SMTP_USERNAME")?,
                password: SecretString::from(env.required("SMTP_PASSWORD")?),
            }))
        } else {
            None
        };

        Ok(Self { from, to, provider })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source; blank values count as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse `key`, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: Option<T>) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => default.ok_or_else(|| ConfigError::MissingEnvVar(key.to_string())),
        }
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // key lengths never approach f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder values and low-entropy API keys.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
