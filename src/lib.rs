//! Compass Coach — linear intake wizard core.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod referral;
pub mod report;
pub mod session;
pub mod store;
