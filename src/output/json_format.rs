//! JSON output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write the complete report as pretty JSON, closed ports included.
pub fn write_json<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}
