//! Lead store interface — an append-only event log, not a database.
//!
//! Each wizard milestone appends one row; there is no upsert or merge. The
//! "current state" of a lead is a derived view, produced by folding all of
//! its rows and taking the latest non-empty value per field.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::QUESTIONS;
use crate::error::StoreError;

/// One appended lead record. Fields a given milestone does not set stay
/// `None` and serialize as empty cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadRow {
    pub lead_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub paid: Option<bool>,
    pub created_utc: Option<DateTime<Utc>>,
    pub ref_code: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub updated_utc: Option<DateTime<Utc>>,
    /// Survey scores keyed by catalog key; stored as `score_<key>` columns.
    pub scores: BTreeMap<String, u8>,
    pub report_ready: Option<bool>,
    pub emailed: Option<bool>,
    pub completed_utc: Option<DateTime<Utc>>,
}

/// Column names, in on-disk order. The score columns follow catalog order.
pub fn columns() -> Vec<String> {
    let mut cols: Vec<String> = [
        "lead_id",
        "name",
        "email",
        "phone",
        "paid",
        "created_utc",
        "ref",
        "utm_source",
        "utm_medium",
        "utm_campaign",
        "updated_utc",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for q in &QUESTIONS {
        cols.push(format!("score_{}", q.key));
    }
    for tail in ["report_ready", "emailed", "completed_utc"] {
        cols.push(tail.to_string());
    }
    cols
}

fn fmt_bool(b: Option<bool>) -> String {
    match b {
        Some(true) => "true".to_string(),
        Some(false) => "false".to_string(),
        None => String::new(),
    }
}

fn fmt_time(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_time(cell: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(cell)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn opt(cell: &str) -> Option<String> {
    if cell.is_empty() { None } else { Some(cell.to_string()) }
}

impl LeadRow {
    /// Serialize into cells matching `columns()` order.
    pub fn to_record(&self) -> Vec<String> {
        let mut cells = vec![
            self.lead_id.clone(),
            self.name.clone().unwrap_or_default(),
            self.email.clone().unwrap_or_default(),
            self.phone.clone().unwrap_or_default(),
            fmt_bool(self.paid),
            fmt_time(self.created_utc),
            self.ref_code.clone().unwrap_or_default(),
            self.utm_source.clone().unwrap_or_default(),
            self.utm_medium.clone().unwrap_or_default(),
            self.utm_campaign.clone().unwrap_or_default(),
            fmt_time(self.updated_utc),
        ];
        for q in &QUESTIONS {
            cells.push(
                self.scores
                    .get(q.key)
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            );
        }
        cells.push(fmt_bool(self.report_ready));
        cells.push(fmt_bool(self.emailed));
        cells.push(fmt_time(self.completed_utc));
        cells
    }

    /// Parse cells in `columns()` order back into a row.
    pub fn from_record(cells: &[String], line: usize) -> Result<Self, StoreError> {
        let expected = columns().len();
        if cells.len() != expected {
            return Err(StoreError::Malformed {
                line,
                reason: format!("expected {expected} cells, got {}", cells.len()),
            });
        }
        let mut scores = BTreeMap::new();
        for (i, q) in QUESTIONS.iter().enumerate() {
            let cell = &cells[11 + i];
            if cell.is_empty() {
                continue;
            }
            let score: u8 = cell.parse().map_err(|_| StoreError::Malformed {
                line,
                reason: format!("bad score for {}: {cell:?}", q.key),
            })?;
            scores.insert(q.key.to_string(), score);
        }
        let tail = 11 + QUESTIONS.len();
        Ok(Self {
            lead_id: cells[0].clone(),
            name: opt(&cells[1]),
            email: opt(&cells[2]),
            phone: opt(&cells[3]),
            paid: parse_bool(&cells[4]),
            created_utc: parse_time(&cells[5]),
            ref_code: opt(&cells[6]),
            utm_source: opt(&cells[7]),
            utm_medium: opt(&cells[8]),
            utm_campaign: opt(&cells[9]),
            updated_utc: parse_time(&cells[10]),
            scores,
            report_ready: parse_bool(&cells[tail]),
            emailed: parse_bool(&cells[tail + 1]),
            completed_utc: parse_time(&cells[tail + 2]),
        })
    }
}

/// Fold a lead's rows into its current state: latest non-empty value wins
/// per field, latest score wins per question.
pub fn fold(rows: &[LeadRow]) -> LeadRow {
    let mut folded = LeadRow::default();
    for row in rows {
        if !row.lead_id.is_empty() {
            folded.lead_id = row.lead_id.clone();
        }
        merge_str(&mut folded.name, &row.name);
        merge_str(&mut folded.email, &row.email);
        merge_str(&mut folded.phone, &row.phone);
        merge(&mut folded.paid, row.paid);
        merge(&mut folded.created_utc, row.created_utc);
        merge_str(&mut folded.ref_code, &row.ref_code);
        merge_str(&mut folded.utm_source, &row.utm_source);
        merge_str(&mut folded.utm_medium, &row.utm_medium);
        merge_str(&mut folded.utm_campaign, &row.utm_campaign);
        merge(&mut folded.updated_utc, row.updated_utc);
        for (key, score) in &row.scores {
            folded.scores.insert(key.clone(), *score);
        }
        merge(&mut folded.report_ready, row.report_ready);
        merge(&mut folded.emailed, row.emailed);
        merge(&mut folded.completed_utc, row.completed_utc);
    }
    folded
}

fn merge<T: Copy>(into: &mut Option<T>, from: Option<T>) {
    if from.is_some() {
        *into = from;
    }
}

fn merge_str(into: &mut Option<String>, from: &Option<String>) {
    if let Some(v) = from {
        if !v.is_empty() {
            *into = Some(v.clone());
        }
    }
}

/// Backend-agnostic lead store. One append per lifecycle milestone; three
/// per completed session (identity, survey, finish).
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Append one row. Must be a single atomic write so concurrent sessions
    /// never interleave within a record.
    async fn append(&self, row: &LeadRow) -> Result<(), StoreError>;

    /// All rows for a lead, in append order.
    async fn rows_for(&self, lead_id: &str) -> Result<Vec<LeadRow>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn columns_cover_catalog() {
        let cols = columns();
        assert_eq!(cols.len(), 14 + QUESTIONS.len());
        assert_eq!(cols[0], "lead_id");
        assert_eq!(cols[6], "ref");
        assert!(cols.contains(&"score_vision".to_string()));
        assert!(cols.contains(&"score_brand".to_string()));
        assert_eq!(cols.last().unwrap(), "completed_utc");
    }

    #[test]
    fn record_roundtrip() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let row = LeadRow {
            lead_id: "lead_1709285400".to_string(),
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            phone: None,
            paid: Some(true),
            created_utc: Some(created),
            ref_code: Some("partner42".to_string()),
            scores: BTreeMap::from([("vision".to_string(), 5), ("sales".to_string(), 2)]),
            ..Default::default()
        };
        let cells = row.to_record();
        assert_eq!(cells.len(), columns().len());
        let parsed = LeadRow::from_record(&cells, 1).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn from_record_rejects_wrong_width() {
        let err = LeadRow::from_record(&["only".to_string()], 3).unwrap_err();
        match err {
            StoreError::Malformed { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fold_takes_latest_non_empty() {
        let first = LeadRow {
            lead_id: "lead_1".to_string(),
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            paid: Some(false),
            ..Default::default()
        };
        let second = LeadRow {
            lead_id: "lead_1".to_string(),
            scores: BTreeMap::from([("vision".to_string(), 4)]),
            ..Default::default()
        };
        let third = LeadRow {
            lead_id: "lead_1".to_string(),
            report_ready: Some(true),
            emailed: Some(false),
            ..Default::default()
        };
        let folded = fold(&[first, second, third]);
        assert_eq!(folded.name.as_deref(), Some("Alice"));
        assert_eq!(folded.paid, Some(false));
        assert_eq!(folded.scores.get("vision"), Some(&4));
        assert_eq!(folded.report_ready, Some(true));
        assert_eq!(folded.emailed, Some(false));
        // Empty strings never overwrite earlier values
        let clobber = LeadRow {
            lead_id: "lead_1".to_string(),
            name: Some(String::new()),
            ..Default::default()
        };
        let folded = fold(&[folded, clobber]);
        assert_eq!(folded.name.as_deref(), Some("Alice"));
    }
}
