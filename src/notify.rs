//! Notification adapter — best-effort SMTP delivery of the report.
//!
//! Absence of mail configuration is a normal, reportable outcome, not a
//! fault: every call returns a `SendOutcome`, never an error. The SMTP
//! transport itself is the same sync lettre setup used elsewhere; callers
//! on an async path run `send_report` under `spawn_blocking`.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::MailConfig;
use crate::error::NotifyError;
use crate::report::REPORT_FILE_NAME;

const BODY_TEXT: &str = "Hi! Your Compass Report is attached.\n\nThank you.";

/// Structured result shown to the user as an informational message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub sent: bool,
    pub message: String,
}

/// Outbound mailer. `None` config means demo mode.
#[derive(Debug, Clone)]
pub struct Mailer {
    config: Option<MailConfig>,
}

impl Mailer {
    pub fn new(config: Option<MailConfig>) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Send the report PDF as an attachment. Blocking.
    pub fn send_report(&self, to: &str, pdf_bytes: &[u8], subject: &str) -> SendOutcome {
        let Some(config) = &self.config else {
            return SendOutcome {
                sent: false,
                message: "Email not configured in demo.".to_string(),
            };
        };
        match send(config, to, pdf_bytes, subject) {
            Ok(()) => {
                tracing::info!("report emailed to {to}");
                SendOutcome {
                    sent: true,
                    message: "Email sent.".to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("report email to {to} failed: {e}");
                SendOutcome {
                    sent: false,
                    message: format!("Email failed: {e}"),
                }
            }
        }
    }
}

fn send(config: &MailConfig, to: &str, pdf_bytes: &[u8], subject: &str) -> Result<(), NotifyError> {
    let pdf_type = ContentType::parse(crate::report::REPORT_MIME)
        .map_err(|e| NotifyError::Build(e.to_string()))?;
    let attachment = Attachment::new(REPORT_FILE_NAME.to_string()).body(pdf_bytes.to_vec(), pdf_type);

    let email = Message::builder()
        .from(
            config
                .from_address
                .parse()
                .map_err(|e| NotifyError::InvalidAddress {
                    address: config.from_address.clone(),
                    reason: format!("{e}"),
                })?,
        )
        .to(to.parse().map_err(|e| NotifyError::InvalidAddress {
            address: to.to_string(),
            reason: format!("{e}"),
        })?)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(BODY_TEXT.to_string()))
                .singlepart(attachment),
        )
        .map_err(|e| NotifyError::Build(e.to_string()))?;

    let creds = Credentials::new(
        config.username.clone(),
        config.password.expose_secret().to_string(),
    );
    let transport = SmtpTransport::starttls_relay(&config.host)
        .map_err(|e| NotifyError::Relay(e.to_string()))?
        .port(config.port)
        .credentials(creds)
        .build();

    transport
        .send(&email)
        .map_err(|e| NotifyError::Send(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_mailer_reports_demo_mode() {
        let mailer = Mailer::new(None);
        assert!(!mailer.is_configured());
        let outcome = mailer.send_report("user@example.com", b"%PDF-", "Your Compass Report");
        assert_eq!(
            outcome,
            SendOutcome {
                sent: false,
                message: "Email not configured in demo.".to_string(),
            }
        );
    }

    #[test]
    fn bad_recipient_degrades_to_outcome() {
        let config = MailConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "coach@example.com".to_string(),
            password: secrecy::SecretString::from("secret".to_string()),
            from_address: "coach@example.com".to_string(),
        };
        let mailer = Mailer::new(Some(config));
        let outcome = mailer.send_report("not-an-address", b"%PDF-", "Your Compass Report");
        assert!(!outcome.sent);
        assert!(outcome.message.starts_with("Email failed:"));
    }
}
