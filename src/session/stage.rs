//! Wizard stage machine — tracks where the user is in the intake flow.

use serde::{Deserialize, Serialize};

/// The stages of the intake wizard.
///
/// Progresses linearly: Landing → Pay → Auth → Survey → Report → Done.
/// The only backward move is a full reset to Landing, which discards the
/// session record entirely and is handled outside `can_transition_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Landing,
    Pay,
    Auth,
    Survey,
    Report,
    Done,
}

impl Stage {
    /// Check if a forward transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            (Landing, Pay) | (Pay, Auth) | (Auth, Survey) | (Survey, Report) | (Report, Done)
        )
    }

    /// Whether this stage is terminal (wizard finished, reset-only).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Get the next stage in the linear progression, if any.
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            Landing => Some(Pay),
            Pay => Some(Auth),
            Auth => Some(Survey),
            Survey => Some(Report),
            Report => Some(Done),
            Done => None,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Landing
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Landing => "landing",
            Self::Pay => "pay",
            Self::Auth => "auth",
            Self::Survey => "survey",
            Self::Report => "report",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use Stage::*;
        let transitions = [
            (Landing, Pay),
            (Pay, Auth),
            (Auth, Survey),
            (Survey, Report),
            (Report, Done),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use Stage::*;
        // Skip stages
        assert!(!Landing.can_transition_to(Auth));
        assert!(!Pay.can_transition_to(Report));
        // Go backward
        assert!(!Survey.can_transition_to(Auth));
        // Terminal
        assert!(!Done.can_transition_to(Landing));
        // Self-transition
        assert!(!Auth.can_transition_to(Auth));
    }

    #[test]
    fn is_terminal() {
        use Stage::*;
        assert!(Done.is_terminal());
        assert!(!Landing.is_terminal());
        assert!(!Report.is_terminal());
    }

    #[test]
    fn next_walks_all_stages() {
        use Stage::*;
        let expected = [Pay, Auth, Survey, Report, Done];
        let mut current = Landing;
        for expected_next in expected {
            let next = current.next().unwrap();
            assert_eq!(next, expected_next);
            current = next;
        }
        assert!(current.next().is_none());
    }

    #[test]
    fn display_matches_serde() {
        use Stage::*;
        for stage in [Landing, Pay, Auth, Survey, Report, Done] {
            let display = format!("{stage}");
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }
}
