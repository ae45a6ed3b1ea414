//! Output formatting module.
//!
//! Renders a [`ScanReport`] on the terminal as plain text, JSON, or CSV. This
//! is display only; reports are persisted by [`crate::storage`].

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{
    print_error, print_info, print_scan_header, print_success, print_warning, write_history,
    write_plain,
};

use crate::cli::OutputFormat;
use crate::scanner::ScanReport;
use std::io;

/// Print a report to stdout in `format`.
pub fn print_report(report: &ScanReport, format: OutputFormat, show_closed: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_plain(&mut out, report, show_closed),
        OutputFormat::Json => write_json(&mut out, report),
        OutputFormat::Csv => write_csv(&mut out, report, show_closed),
    }
}
