//! Session record and the action/effect vocabulary of the stage machine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::LeadRow;

use super::stage::Stage;

/// Who the user is, collected once in the auth stage and immutable
/// afterward within the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub full_name: String,
    pub phone: String,
}

/// Referral attribution, captured once at session start from the entry URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    /// The `ref` query parameter ("ref" is reserved in Rust, hence the name).
    pub ref_code: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
}

impl Referral {
    /// Whether any attribution field was present on the entry URL.
    pub fn is_attributed(&self) -> bool {
        !(self.ref_code.is_empty()
            && self.utm_source.is_empty()
            && self.utm_medium.is_empty()
            && self.utm_campaign.is_empty())
    }
}

/// One answered question: a 1–5 score plus an optional free-text note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub score: u8,
    pub note: String,
}

impl Answer {
    pub fn scored(score: u8) -> Self {
        Self { score, note: String::new() }
    }
}

/// The wizard's accumulating state, one value per user interaction.
///
/// The record is passed by `&mut` through the engine; there is no global
/// singleton. A "start over" replaces the whole value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub stage: Stage,
    pub identity: Identity,
    pub referral: Referral,
    /// Set by payment confirmation. Progression is deliberately not gated
    /// on this flag; see DESIGN.md.
    pub paid: bool,
    /// Keyed by catalog question key; empty until the single survey
    /// submission, then exactly one in-range entry per key.
    pub answers: BTreeMap<String, Answer>,
    /// Generated PDF, cached so download and email reuse identical bytes.
    #[serde(skip)]
    pub report_bytes: Option<Vec<u8>>,
    /// `"lead_{unix_seconds}"`, assigned at identity submission.
    pub lead_id: String,
}

impl Session {
    /// Fresh session at the landing stage with the given attribution.
    pub fn new(referral: Referral) -> Self {
        Self {
            referral,
            ..Self::default()
        }
    }
}

/// User-triggered actions, one per wizard control.
#[derive(Debug, Clone)]
pub enum Action {
    /// Landing → Pay.
    Start,
    /// Pay → Auth; marks the session paid.
    ConfirmPayment,
    /// Auth → Survey when email, name, and password are all non-empty.
    /// The password is validated and dropped, never stored.
    SubmitIdentity {
        email: String,
        full_name: String,
        phone: String,
        password: String,
    },
    /// Survey → Report; must cover every catalog key.
    SubmitAnswers(BTreeMap<String, Answer>),
    /// Report → Done; records whether the report was emailed.
    Finish { emailed: bool },
    /// Any stage → fresh Landing session with recaptured attribution.
    StartOver { referral: Referral },
}

impl Action {
    /// Short name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ConfirmPayment => "confirm_payment",
            Self::SubmitIdentity { .. } => "submit_identity",
            Self::SubmitAnswers(_) => "submit_answers",
            Self::Finish { .. } => "finish",
            Self::StartOver { .. } => "start_over",
        }
    }
}

/// Side-effect requests returned by the pure machine and executed by the
/// engine, keeping the core testable without a store or transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append one row to the lead event log.
    PersistLead(LeadRow),
}
