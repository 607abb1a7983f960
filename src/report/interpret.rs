//! Interpretation engine — deterministic, rule-based reading of the scores.

use std::collections::BTreeMap;

use crate::catalog::QUESTIONS;
use crate::error::ReportError;
use crate::session::Answer;

const SALES_LABEL: &str = "Sales & lead generation";
const FINANCE_LABEL: &str = "Financial tracking & pricing";
const BRAND_LABEL: &str = "Brand & online presence";

/// Produce the textual summary for a completed answer set.
///
/// A missing catalog key means the survey-completion invariant was broken
/// upstream; it fails rather than substituting a default score.
pub fn interpret(answers: &BTreeMap<String, Answer>) -> Result<String, ReportError> {
    let mut total = 0u32;
    let mut low: Vec<&str> = Vec::new();
    let mut high: Vec<&str> = Vec::new();

    // Catalog order, so strengths and focus areas list in spoke order.
    for q in &QUESTIONS {
        let answer = answers.get(q.key).ok_or_else(|| ReportError::MissingScore {
            key: q.key.to_string(),
        })?;
        total += u32::from(answer.score);
        if answer.score <= 2 {
            low.push(q.label);
        } else if answer.score >= 4 {
            high.push(q.label);
        }
    }
    let avg = f64::from(total) / QUESTIONS.len() as f64;

    let mut lines = vec![format!("Your overall readiness score is {avg:.1}/5.")];
    if !high.is_empty() {
        lines.push(format!("Strengths: {}.", high.join(", ")));
    }
    if !low.is_empty() {
        lines.push(format!("Focus areas: {}.", low.join(", ")));
    }
    lines.push("Recommended next steps:".to_string());
    if low.contains(&SALES_LABEL) {
        lines.push(
            "- Implement a lead pipeline with clear weekly targets and tracking.".to_string(),
        );
    }
    if low.contains(&FINANCE_LABEL) {
        lines.push("- Set up monthly P&L tracking and review unit economics.".to_string());
    }
    if low.contains(&BRAND_LABEL) {
        lines.push("- Refresh website messaging and create a content calendar.".to_string());
    }
    if low.is_empty() {
        lines.push("- You’re in great shape. Consider accelerating growth initiatives.".to_string());
    }
    Ok(lines.join(" "))
}
