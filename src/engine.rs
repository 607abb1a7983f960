//! Wizard engine — runs the pure machine and executes its side effects.
//!
//! The engine owns the external collaborators (lead store, mailer). Store
//! failures are logged and swallowed so the wizard never stalls on the
//! mock CRM; validation errors propagate so the caller can re-prompt.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{Error, ReportError};
use crate::notify::{Mailer, SendOutcome};
use crate::report::{interpret, render_report};
use crate::session::{Action, Effect, Session, machine};
use crate::store::LeadStore;

pub struct WizardEngine {
    store: Arc<dyn LeadStore>,
    mailer: Mailer,
}

impl WizardEngine {
    pub fn new(store: Arc<dyn LeadStore>, mailer: Mailer) -> Self {
        Self { store, mailer }
    }

    /// Apply a user action, then execute the persistence it requested.
    pub async fn apply(&self, session: &mut Session, action: Action) -> Result<(), Error> {
        self.apply_at(session, action, Utc::now()).await
    }

    /// Clock-injected variant of [`apply`](Self::apply).
    pub async fn apply_at(
        &self,
        session: &mut Session,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let action_name = action.name();
        let effects = machine::apply(session, action, now)?;
        for effect in effects {
            match effect {
                Effect::PersistLead(row) => {
                    // Non-fatal: the wizard continues on a degraded CRM.
                    if let Err(e) = self.store.append(&row).await {
                        tracing::warn!(
                            "lead store append failed for {} after {action_name}: {e}",
                            row.lead_id
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// The report bytes for this session, generated once and cached so
    /// download and email reuse identical bytes.
    pub fn report_bytes(&self, session: &mut Session) -> Result<Vec<u8>, ReportError> {
        self.report_bytes_at(session, Utc::now())
    }

    /// Clock-injected variant of [`report_bytes`](Self::report_bytes).
    pub fn report_bytes_at(
        &self,
        session: &mut Session,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>, ReportError> {
        if let Some(bytes) = &session.report_bytes {
            return Ok(bytes.clone());
        }
        let insights = interpret(&session.answers)?;
        let bytes = render_report(
            &session.identity.full_name,
            &session.identity.email,
            &session.answers,
            &insights,
            generated_at,
        )?;
        session.report_bytes = Some(bytes.clone());
        Ok(bytes)
    }

    /// Email the (cached) report to the session's own address.
    pub async fn email_report(&self, session: &mut Session) -> Result<SendOutcome, ReportError> {
        let pdf = self.report_bytes(session)?;
        let mailer = self.mailer.clone();
        let to = session.identity.email.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            mailer.send_report(&to, &pdf, "Your Compass Report")
        })
        .await
        .unwrap_or_else(|e| SendOutcome {
            sent: false,
            message: format!("Email failed: {e}"),
        });
        Ok(outcome)
    }
}
