//! Scan history persistence.
//!
//! Provides JSON-file storage of finished scan reports.

mod json_store;

pub use json_store::ScanStore;
