//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::{ProbeResult, ProbeStatus, ScanReport};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write a report as a styled table.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport, show_closed: bool) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("NetTrackr").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target.host)?;
    writeln!(out, "  {} {}", style("Address:").bold(), report.target.address)?;
    writeln!(
        out,
        "  {} {}",
        style("Started:").bold(),
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(report.id.short()).dim()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s",
        style("Statistics:").bold(),
        report.results.len(),
        report.duration().as_secs_f64()
    )?;
    writeln!(
        out,
        "               {} open, {} closed, {} filtered, {} error",
        style(report.counts.open).green().bold(),
        style(report.counts.closed).red(),
        style(report.counts.filtered).yellow(),
        style(report.counts.error).magenta()
    )?;
    if report.deadline_exceeded() {
        writeln!(
            out,
            "  {}",
            style("Scan deadline exceeded; unscanned ports are marked error.").yellow()
        )?;
    }
    writeln!(out)?;

    let rows: Vec<&ProbeResult> = visible(report, show_closed).collect();
    if rows.is_empty() {
        writeln!(out, "  {}", style("No ports to display.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:^10}  {:>8}  {}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("TIME").bold(),
            style("DETAIL").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for result in rows {
            writeln!(
                out,
                "  {:>6}  {:^10}  {:>6}ms  {}",
                result.port,
                status_style(result.status).apply_to(result.status.to_string()),
                result.elapsed.as_millis(),
                style(truncate_string(result.detail.as_deref().unwrap_or(""), 35)).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Write one line per stored scan, most recent first as given.
pub fn write_history<W: Write>(out: &mut W, reports: &[ScanReport], detailed: bool) -> io::Result<()> {
    if reports.is_empty() {
        writeln!(out, "  {}", style("No scans in history.").dim())?;
        return Ok(());
    }

    for report in reports {
        writeln!(
            out,
            "  {}  {}  {}",
            style(report.id.short()).dim(),
            report.started_at.format("%Y-%m-%d %H:%M"),
            report.summary()
        )?;
        if detailed {
            let open: Vec<String> = report.open_ports().map(|r| r.port.to_string()).collect();
            writeln!(
                out,
                "            open: {}",
                if open.is_empty() {
                    "-".to_string()
                } else {
                    open.join(", ")
                }
            )?;
        }
    }
    Ok(())
}

/// Results worth showing: closed ports are hidden unless asked for.
pub(super) fn visible(
    report: &ScanReport,
    show_closed: bool,
) -> impl Iterator<Item = &ProbeResult> {
    report
        .results
        .iter()
        .filter(move |r| show_closed || r.status != ProbeStatus::Closed)
}

fn status_style(status: ProbeStatus) -> Style {
    match status {
        ProbeStatus::Open => Style::new().green().bold(),
        ProbeStatus::Closed => Style::new().red(),
        ProbeStatus::Filtered => Style::new().yellow(),
        ProbeStatus::Error => Style::new().magenta(),
    }
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(host: &str, ports: usize, workers: usize, timeout_ms: u128) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("NetTrackr").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{} Target: {}", style("•").dim(), style(host).white().bold());
    eprintln!(
        "{} Scanning {} ports with {} workers ({}ms timeout)...",
        style("•").dim(),
        style(ports).white().bold(),
        workers,
        timeout_ms
    );
    eprintln!();
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

pub fn print_success(msg: &str) {
    eprintln!("{} {}", style("✓").green().bold(), msg);
}

pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate to at most `max_len` characters, adding an ellipsis if cut.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ScanConfig, DEADLINE_EXCEEDED};
    use crate::types::{Port, ScanTarget};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn report() -> ScanReport {
        let p = |n| Port::new(n).unwrap();
        let target = ScanTarget::new("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST));
        ScanReport::begin(target, ScanConfig::new([p(22), p(80), p(9999)])).finalize(vec![
            ProbeResult::new(p(22), ProbeStatus::Closed, Duration::from_millis(1)),
            ProbeResult::new(p(80), ProbeStatus::Open, Duration::from_millis(2)),
            ProbeResult::error(p(9999), Duration::ZERO, DEADLINE_EXCEEDED),
        ])
    }

    fn render(show_closed: bool) -> String {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        write_plain(&mut buf, &report(), show_closed).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_plain_hides_closed_by_default() {
        let text = render(false);
        assert!(text.contains("1 open, 1 closed, 0 filtered, 1 error"));
        assert!(text.contains("deadline exceeded"));
        assert!(!text.lines().any(|l| l.trim_start().starts_with("22 ")));
        assert!(text.lines().any(|l| l.trim_start().starts_with("80 ")));
    }

    #[test]
    fn test_plain_show_closed() {
        let text = render(true);
        assert!(text.lines().any(|l| l.trim_start().starts_with("22 ")));
    }

    #[test]
    fn test_history_listing() {
        console::set_colors_enabled(false);
        let report = report();
        let mut buf = Vec::new();
        write_history(&mut buf, std::slice::from_ref(&report), true).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains(&report.id.short()));
        assert!(text.contains("open: 80"));

        let mut empty = Vec::new();
        write_history(&mut empty, &[], false).unwrap();
        assert!(String::from_utf8(empty).unwrap().contains("No scans"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }
}
