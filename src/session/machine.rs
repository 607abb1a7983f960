//! The stage machine proper — pure action handlers.
//!
//! `apply` takes the current session record and an action payload, mutates
//! the record forward, and returns the side-effect requests (lead-store
//! appends) for the caller to execute. Nothing here touches disk, network,
//! or the wall clock, which keeps every transition testable in isolation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::catalog::{QUESTIONS, question};
use crate::error::SessionError;
use crate::store::LeadRow;

use super::model::{Action, Answer, Effect, Identity, Session};
use super::stage::Stage;

/// Apply one user action to the session.
///
/// On error the session is left untouched and stays in its current stage;
/// the caller surfaces the message and re-prompts. `now` is injected so
/// lead ids and row timestamps are deterministic under test.
pub fn apply(
    session: &mut Session,
    action: Action,
    now: DateTime<Utc>,
) -> Result<Vec<Effect>, SessionError> {
    match action {
        Action::Start => {
            expect_stage(session, Stage::Landing, "start")?;
            session.stage = Stage::Pay;
            Ok(Vec::new())
        }

        Action::ConfirmPayment => {
            expect_stage(session, Stage::Pay, "confirm_payment")?;
            session.paid = true;
            session.stage = Stage::Auth;
            Ok(Vec::new())
        }

        Action::SubmitIdentity {
            email,
            full_name,
            phone,
            password,
        } => {
            expect_stage(session, Stage::Auth, "submit_identity")?;
            if email.is_empty() || full_name.is_empty() || password.is_empty() {
                return Err(SessionError::MissingIdentityFields);
            }
            // The password is only ever checked for presence; it is dropped
            // here and never persisted.
            drop(password);

            if !session.paid {
                tracing::warn!("identity submitted without a confirmed payment");
            }

            session.identity = Identity {
                email,
                full_name,
                phone,
            };
            session.lead_id = format!("lead_{}", now.timestamp());
            session.stage = Stage::Survey;
            Ok(vec![Effect::PersistLead(identity_row(session, now))])
        }

        Action::SubmitAnswers(answers) => {
            expect_stage(session, Stage::Survey, "submit_answers")?;
            validate_answers(&answers)?;
            session.answers = answers;
            session.stage = Stage::Report;
            Ok(vec![Effect::PersistLead(scores_row(session, now))])
        }

        Action::Finish { emailed } => {
            expect_stage(session, Stage::Report, "finish")?;
            session.stage = Stage::Done;
            Ok(vec![Effect::PersistLead(completion_row(
                session, emailed, now,
            ))])
        }

        Action::StartOver { referral } => {
            // Allowed from any stage; the old record is discarded wholesale.
            *session = Session::new(referral);
            Ok(Vec::new())
        }
    }
}

fn expect_stage(
    session: &Session,
    expected: Stage,
    action: &'static str,
) -> Result<(), SessionError> {
    if session.stage != expected {
        return Err(SessionError::WrongStage {
            action,
            stage: session.stage.to_string(),
        });
    }
    Ok(())
}

fn validate_answers(answers: &BTreeMap<String, Answer>) -> Result<(), SessionError> {
    for key in answers.keys() {
        if question(key).is_none() {
            return Err(SessionError::UnknownQuestion { key: key.clone() });
        }
    }
    for q in &QUESTIONS {
        let answer = answers
            .get(q.key)
            .ok_or_else(|| SessionError::MissingAnswer {
                key: q.key.to_string(),
            })?;
        if !(1..=5).contains(&answer.score) {
            return Err(SessionError::ScoreOutOfRange {
                key: q.key.to_string(),
                score: answer.score,
            });
        }
    }
    Ok(())
}

/// Row appended at identity submission: who the lead is, plus attribution.
fn identity_row(session: &Session, now: DateTime<Utc>) -> LeadRow {
    LeadRow {
        lead_id: session.lead_id.clone(),
        name: Some(session.identity.full_name.clone()),
        email: Some(session.identity.email.clone()),
        phone: Some(session.identity.phone.clone()),
        paid: Some(session.paid),
        created_utc: Some(now),
        ref_code: Some(session.referral.ref_code.clone()),
        utm_source: Some(session.referral.utm_source.clone()),
        utm_medium: Some(session.referral.utm_medium.clone()),
        utm_campaign: Some(session.referral.utm_campaign.clone()),
        ..Default::default()
    }
}

/// Row appended at survey completion: scores only.
fn scores_row(session: &Session, now: DateTime<Utc>) -> LeadRow {
    LeadRow {
        lead_id: session.lead_id.clone(),
        updated_utc: Some(now),
        scores: session
            .answers
            .iter()
            .map(|(k, a)| (k.clone(), a.score))
            .collect(),
        ..Default::default()
    }
}

/// Row appended at finish: completion flags. One per `finish`, no dedup.
fn completion_row(session: &Session, emailed: bool, now: DateTime<Utc>) -> LeadRow {
    LeadRow {
        lead_id: session.lead_id.clone(),
        report_ready: Some(true),
        emailed: Some(emailed),
        completed_utc: Some(now),
        ..Default::default()
    }
}
