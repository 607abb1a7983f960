//! End-to-end wizard flow against the real CSV lead store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use compass_coach::catalog::QUESTIONS;
use compass_coach::engine::WizardEngine;
use compass_coach::error::Error;
use compass_coach::notify::Mailer;
use compass_coach::referral::{ReferralSource, UrlReferral};
use compass_coach::session::{Action, Answer, Session, Stage};
use compass_coach::store::{CsvLeadStore, LeadStore, fold};

fn scenario_answers() -> BTreeMap<String, Answer> {
    [
        ("vision", 5),
        ("market", 5),
        ("product", 1),
        ("sales", 1),
        ("ops", 3),
        ("finance", 3),
        ("team", 4),
        ("brand", 2),
    ]
    .iter()
    .map(|(k, s)| {
        (
            k.to_string(),
            Answer {
                score: *s,
                note: format!("note for {k}"),
            },
        )
    })
    .collect()
}

#[tokio::test]
async fn full_wizard_session_leaves_three_foldable_rows() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CsvLeadStore::new(dir.path().join("leads_db.csv")));
    let engine = WizardEngine::new(store.clone(), Mailer::new(None));

    let referral = UrlReferral::parse(
        "https://compass.example.com/?ref=partner42&utm_source=newsletter&utm_campaign=q1",
    )
    .unwrap()
    .referral();
    let mut session = Session::new(referral);
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

    engine.apply_at(&mut session, Action::Start, now).await.unwrap();
    engine
        .apply_at(&mut session, Action::ConfirmPayment, now)
        .await
        .unwrap();

    // Missing password keeps us in auth
    let err = engine
        .apply_at(
            &mut session,
            Action::SubmitIdentity {
                email: "amin@example.com".to_string(),
                full_name: "Amin Tan".to_string(),
                phone: String::new(),
                password: String::new(),
            },
            now,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Session(_)));
    assert_eq!(session.stage, Stage::Auth);

    engine
        .apply_at(
            &mut session,
            Action::SubmitIdentity {
                email: "amin@example.com".to_string(),
                full_name: "Amin Tan".to_string(),
                phone: "+60123456789".to_string(),
                password: "hunter2".to_string(),
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(session.lead_id, format!("lead_{}", now.timestamp()));

    engine
        .apply_at(&mut session, Action::SubmitAnswers(scenario_answers()), now)
        .await
        .unwrap();
    assert_eq!(session.stage, Stage::Report);

    // Report: generated once, cached, deterministic within the session
    let pdf = engine.report_bytes_at(&mut session, now).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let again = engine.report_bytes_at(&mut session, now).unwrap();
    assert_eq!(pdf, again);

    // Email in demo mode is a reported non-error
    let outcome = engine.email_report(&mut session).await.unwrap();
    assert!(!outcome.sent);
    assert_eq!(outcome.message, "Email not configured in demo.");

    engine
        .apply_at(&mut session, Action::Finish { emailed: outcome.sent }, now)
        .await
        .unwrap();
    assert_eq!(session.stage, Stage::Done);

    // The log holds exactly the three milestone rows for this lead
    let rows = store.rows_for(&session.lead_id).await.unwrap();
    assert_eq!(rows.len(), 3);

    let lead = fold(&rows);
    assert_eq!(lead.name.as_deref(), Some("Amin Tan"));
    assert_eq!(lead.email.as_deref(), Some("amin@example.com"));
    assert_eq!(lead.paid, Some(true));
    assert_eq!(lead.ref_code.as_deref(), Some("partner42"));
    assert_eq!(lead.utm_source.as_deref(), Some("newsletter"));
    assert_eq!(lead.scores.len(), QUESTIONS.len());
    assert_eq!(lead.scores.get("sales"), Some(&1));
    assert_eq!(lead.report_ready, Some(true));
    assert_eq!(lead.emailed, Some(false));
    assert!(lead.completed_utc.is_some());
}

#[tokio::test]
async fn start_over_begins_a_fresh_lead() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CsvLeadStore::new(dir.path().join("leads_db.csv")));
    let engine = WizardEngine::new(store.clone(), Mailer::new(None));

    let mut session = Session::new(Default::default());
    let first = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

    engine.apply_at(&mut session, Action::Start, first).await.unwrap();
    engine
        .apply_at(&mut session, Action::ConfirmPayment, first)
        .await
        .unwrap();
    engine
        .apply_at(
            &mut session,
            Action::SubmitIdentity {
                email: "first@example.com".to_string(),
                full_name: "First User".to_string(),
                phone: String::new(),
                password: "pw".to_string(),
            },
            first,
        )
        .await
        .unwrap();
    let first_lead = session.lead_id.clone();

    engine
        .apply_at(&mut session, Action::StartOver { referral: Default::default() }, first)
        .await
        .unwrap();
    assert_eq!(session.stage, Stage::Landing);
    assert!(session.lead_id.is_empty());

    // Second run gets its own lead id; the first lead's rows remain.
    let second = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
    engine.apply_at(&mut session, Action::Start, second).await.unwrap();
    engine
        .apply_at(&mut session, Action::ConfirmPayment, second)
        .await
        .unwrap();
    engine
        .apply_at(
            &mut session,
            Action::SubmitIdentity {
                email: "second@example.com".to_string(),
                full_name: "Second User".to_string(),
                phone: String::new(),
                password: "pw".to_string(),
            },
            second,
        )
        .await
        .unwrap();
    assert_ne!(session.lead_id, first_lead);

    assert_eq!(store.rows_for(&first_lead).await.unwrap().len(), 1);
    assert_eq!(store.rows_for(&session.lead_id).await.unwrap().len(), 1);
}
