//! Configuration — environment-driven, everything optional.
//!
//! Absence of a variable means demo mode for that integration: payment is
//! simulated, email is a reportable no-op, and the booking link falls back
//! to the generic scheduling domain.

use std::path::PathBuf;

use secrecy::SecretString;

/// Application display name, used on the landing banner and the PDF title.
pub const APP_NAME: &str = "AI Coach – Business Diagnostic";

/// Diagnostic price shown on the landing and payment screens (MYR).
pub const PRICE_MYR: u32 = 99;

/// SMTP transport configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl MailConfig {
    /// Build from `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`.
    /// Returns `None` unless host, user, and password are all set — the
    /// partial case counts as unconfigured, matching the demo behavior.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok().filter(|s| !s.is_empty())?;
        let username = std::env::var("SMTP_USER").ok().filter(|s| !s.is_empty())?;
        let password = std::env::var("SMTP_PASS").ok().filter(|s| !s.is_empty())?;

        let port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        Some(Self {
            host,
            port,
            from_address: username.clone(),
            username,
            password: SecretString::from(password),
        })
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Stripe publishable key; empty means payment stays in demo mode.
    pub stripe_publishable_key: String,
    /// Stripe secret key, kept only so a real integration can pick it up.
    pub stripe_secret_key: Option<SecretString>,
    /// Booking link offered after the report.
    pub booking_url: String,
    /// Mail transport; `None` means email is a reportable no-op.
    pub mail: Option<MailConfig>,
    /// Path of the append-only lead log.
    pub leads_path: PathBuf,
}

impl AppConfig {
    /// Read all optional settings from the environment.
    pub fn from_env() -> Self {
        Self {
            stripe_publishable_key: std::env::var("STRIPE_PUBLISHABLE_KEY").unwrap_or_default(),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY")
                .ok()
                .filter(|s| !s.is_empty())
                .map(SecretString::from),
            booking_url: std::env::var("CALENDLY_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://calendly.com/".to_string()),
            mail: MailConfig::from_env(),
            leads_path: std::env::var("LEADS_DB_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("leads_db.csv")),
        }
    }
}
