//! CSV-backed lead store — the mock CRM.
//!
//! One quoted CSV record per append, written with a single `write_all` on a
//! file opened in append mode so concurrent sessions cannot interleave
//! inside a record. The header goes out with the first record. No crate in
//! our stack covers CSV, so quoting and splitting are done here by hand.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

use super::traits::{LeadRow, LeadStore, columns};

/// Append-only CSV lead log.
#[derive(Debug, Clone)]
pub struct CsvLeadStore {
    path: PathBuf,
}

impl CsvLeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every data row in the file, in append order.
    pub async fn all_rows(&self) -> Result<Vec<LeadRow>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut rows = Vec::new();
        let header = encode_record(&columns());
        for (idx, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            // First line is the header we wrote ourselves
            if idx == 0 && line == header {
                continue;
            }
            let cells = split_record(line);
            rows.push(LeadRow::from_record(&cells, idx + 1)?);
        }
        Ok(rows)
    }
}

#[async_trait]
impl LeadStore for CsvLeadStore {
    async fn append(&self, row: &LeadRow) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut buf = String::new();
        if file.metadata().await?.len() == 0 {
            buf.push_str(&encode_record(&columns()));
            buf.push('\n');
        }
        buf.push_str(&encode_record(&row.to_record()));
        buf.push('\n');

        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn rows_for(&self, lead_id: &str) -> Result<Vec<LeadRow>, StoreError> {
        let rows = self.all_rows().await?;
        Ok(rows.into_iter().filter(|r| r.lead_id == lead_id).collect())
    }
}

fn needs_quoting(cell: &str) -> bool {
    cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

fn encode_record(cells: &[String]) -> String {
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quoting(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out
}

fn split_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => cells.push(std::mem::take(&mut cell)),
                _ => cell.push(c),
            }
        }
    }
    cells.push(cell);
    cells
}
