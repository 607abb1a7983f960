//! Question catalog — the eight assessed business areas.
//!
//! The catalog is fixed at compile time. Its order defines both the survey
//! form order and the radar-chart spoke order, so every consumer iterates
//! `QUESTIONS` rather than whatever map it holds answers in.

/// One assessed business area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Stable identifier, used as the answer map key and in the
    /// `score_<key>` lead-store columns.
    pub key: &'static str,
    /// Human-readable label shown on forms, in the report, and on the chart.
    pub label: &'static str,
}

/// The Compass questions, in survey and chart order.
pub const QUESTIONS: [Question; 8] = [
    Question { key: "vision", label: "Clarity of vision & goals" },
    Question { key: "market", label: "Market understanding & positioning" },
    Question { key: "product", label: "Product/Service readiness" },
    Question { key: "sales", label: "Sales & lead generation" },
    Question { key: "ops", label: "Operations & delivery" },
    Question { key: "finance", label: "Financial tracking & pricing" },
    Question { key: "team", label: "Team & hiring" },
    Question { key: "brand", label: "Brand & online presence" },
];

/// Look up a question by its key.
pub fn question(key: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        for (i, a) in QUESTIONS.iter().enumerate() {
            for b in &QUESTIONS[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn lookup_by_key() {
        assert_eq!(question("sales").unwrap().label, "Sales & lead generation");
        assert!(question("growth").is_none());
    }
}
