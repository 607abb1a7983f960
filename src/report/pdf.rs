//! Report renderer — hand-assembled PDF, no chart library.
//!
//! Three logical pages on US letter: the text summary, a schematic radar
//! chart drawn with straight-line primitives, and a blank closing page.
//! Rendering is pure in its inputs; with a fixed `generated_at` the output
//! bytes are identical across calls.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::catalog::QUESTIONS;
use crate::config::APP_NAME;
use crate::error::ReportError;
use crate::session::Answer;

/// Download filename for the generated report.
pub const REPORT_FILE_NAME: &str = "Compass_Report.pdf";

/// MIME type of the generated report.
pub const REPORT_MIME: &str = "application/pdf";

const PAGE_W: f32 = 612.0;
const PAGE_H: f32 = 792.0;
const MARGIN: f32 = 72.0;

// Chart geometry: fixed center and spoke radius.
const CHART_CX: f32 = 300.0;
const CHART_CY: f32 = 400.0;
const CHART_R: f32 = 150.0;

/// Render the full Compass Report.
pub fn render_report(
    name: &str,
    email: &str,
    answers: &BTreeMap<String, Answer>,
    insights: &str,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    // Scores in catalog order; a missing key is an upstream invariant
    // violation and fails the whole generation.
    let mut scores = Vec::with_capacity(QUESTIONS.len());
    for q in &QUESTIONS {
        let answer = answers.get(q.key).ok_or_else(|| ReportError::MissingScore {
            key: q.key.to_string(),
        })?;
        scores.push(answer.score);
    }

    let mut pages = Vec::new();
    summary_pages(&mut pages, name, email, &scores, insights, generated_at);
    pages.push(chart_page(&scores));
    pages.push(PageOps::new()); // blank closing page

    assemble(pages)
}

// ── Page content ────────────────────────────────────────────────────

/// A real-number operand.
fn real(v: f32) -> Object {
    Object::Real(v.into())
}

/// Operations for one page content stream.
struct PageOps {
    ops: Vec<Operation>,
}

impl PageOps {
    fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Draw `text` with its baseline at (x, y). `font` is the resource
    /// name: F1 = Helvetica, F2 = Helvetica-Bold.
    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), real(size)]));
        self.ops.push(Operation::new("Td", vec![real(x), real(y)]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(winansi(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push(Operation::new("m", vec![real(x1), real(y1)]));
        self.ops.push(Operation::new("l", vec![real(x2), real(y2)]));
        self.ops.push(Operation::new("S", vec![]));
    }
}

/// Page 1 (plus continuation pages when the insights run long): title
/// block, score table, and the word-wrapped interpretation.
fn summary_pages(
    pages: &mut Vec<PageOps>,
    name: &str,
    email: &str,
    scores: &[u8],
    insights: &str,
    generated_at: DateTime<Utc>,
) {
    let mut page = PageOps::new();
    page.text(
        "F2",
        16.0,
        MARGIN,
        PAGE_H - 72.0,
        &format!("{APP_NAME} – Compass Report"),
    );
    page.text("F1", 11.0, MARGIN, PAGE_H - 96.0, &format!("Name: {name}"));
    page.text("F1", 11.0, MARGIN, PAGE_H - 112.0, &format!("Email: {email}"));
    page.text(
        "F1",
        11.0,
        MARGIN,
        PAGE_H - 128.0,
        &format!("Date: {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
    );

    let mut y = PAGE_H - 160.0;
    page.text("F2", 12.0, MARGIN, y, "Compass Scores (1–5)");
    y -= 18.0;
    for (q, score) in QUESTIONS.iter().zip(scores) {
        page.text("F1", 10.0, 80.0, y, &format!("- {}: {score}", q.label));
        y -= 14.0;
    }

    y -= 10.0;
    page.text("F2", 12.0, MARGIN, y, "Milestones & Interpretation");
    y -= 16.0;
    for line in wrap_text(insights) {
        page.text("F1", 10.0, 80.0, y, &line);
        y -= 13.0;
        if y < MARGIN {
            pages.push(page);
            page = PageOps::new();
            y = PAGE_H - 72.0;
        }
    }
    pages.push(page);
}

/// Page 2: the radar schematic — labeled spokes plus the score polygon.
fn chart_page(scores: &[u8]) -> PageOps {
    let mut page = PageOps::new();
    page.text("F2", 14.0, MARGIN, PAGE_H - 72.0, "Compass Chart");

    let tips = spoke_tips(CHART_CX, CHART_CY, CHART_R);
    for (q, (x, y)) in QUESTIONS.iter().zip(&tips) {
        page.line(CHART_CX, CHART_CY, *x, *y);
        let label: String = q.label.chars().take(16).collect();
        page.text("F1", 9.0, x + 4.0, y + 4.0, &label);
    }

    let pts = radar_polygon(scores, CHART_CX, CHART_CY, CHART_R);
    for i in 0..pts.len() {
        let (x1, y1) = pts[i];
        let (x2, y2) = pts[(i + 1) % pts.len()];
        page.line(x1, y1, x2, y2);
    }
    page
}

/// Greedy word wrap matching the page width: a line plus a space plus the
/// next word must stay under 90 characters.
fn wrap_text(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.chars().count() + word.chars().count() + 1 < 90 {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Angle of spoke `i` out of `n`: even division of the circle, offset so
/// the first spoke sits on the vertical axis.
fn spoke_angle(i: usize, n: usize) -> f64 {
    2.0 * PI * (i as f64 / n as f64) - PI / 2.0
}

/// Full-radius spoke endpoints in catalog order.
fn spoke_tips(cx: f32, cy: f32, radius: f32) -> Vec<(f32, f32)> {
    (0..QUESTIONS.len())
        .map(|i| {
            let angle = spoke_angle(i, QUESTIONS.len());
            (
                cx + radius * angle.cos() as f32,
                cy + radius * angle.sin() as f32,
            )
        })
        .collect()
}

/// Polygon vertices: along each spoke at (score / 5) of the radius.
fn radar_polygon(scores: &[u8], cx: f32, cy: f32, radius: f32) -> Vec<(f32, f32)> {
    scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            let r = f32::from(*score) / 5.0 * radius;
            let angle = spoke_angle(i, scores.len());
            (cx + r * angle.cos() as f32, cy + r * angle.sin() as f32)
        })
        .collect()
}

/// Encode text for the WinAnsi-encoded Type1 fonts. Punctuation the
/// summary actually uses (en dash, curly quotes) maps to its single-byte
/// code; anything else outside Latin-1 degrades to '?'.
fn winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            c if (c as u32) <= 0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

// ── Document assembly ───────────────────────────────────────────────

fn assemble(pages: Vec<PageOps>) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let helvetica_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => helvetica,
            "F2" => helvetica_bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content { operations: page.ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), real(PAGE_W), real(PAGE_H)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}
