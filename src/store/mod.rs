//! Persistence layer — append-only lead event log (mock CRM).

pub mod csv_backend;
pub mod traits;

pub use csv_backend::CsvLeadStore;
pub use traits::{LeadRow, LeadStore, columns, fold};
