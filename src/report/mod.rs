//! Report pipeline — interpretation plus PDF rendering.
//!
//! Consumes a completed answer set and produces the Compass Report bytes.
//! Both halves are pure: the interpretation is rule-based and the renderer
//! takes an injected timestamp, so tests pin the clock and compare bytes.

pub mod interpret;
pub mod pdf;

pub use interpret::interpret;
pub use pdf::{REPORT_FILE_NAME, REPORT_MIME, render_report};
