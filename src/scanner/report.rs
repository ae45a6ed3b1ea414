//! Scan reports.
//!
//! A report is opened when a scan starts and finalized once every requested
//! port has a result. After that it belongs to the caller; the engine keeps
//! nothing.

use crate::scanner::traits::{ProbeResult, ProbeStatus, ScanConfig};
use crate::types::{ScanId, ScanTarget};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Detail recorded for ports the overall deadline cut off.
pub const DEADLINE_EXCEEDED: &str = "scan deadline exceeded";

/// Number of results per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn tally<'a>(results: impl IntoIterator<Item = &'a ProbeResult>) -> Self {
        results
            .into_iter()
            .fold(Self::default(), |mut counts, result| {
                match result.status {
                    ProbeStatus::Open => counts.open += 1,
                    ProbeStatus::Closed => counts.closed += 1,
                    ProbeStatus::Filtered => counts.filtered += 1,
                    ProbeStatus::Error => counts.error += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.open + self.closed + self.filtered + self.error
    }
}

/// The complete outcome of one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub id: ScanId,
    pub target: ScanTarget,
    /// The configuration the scan ran with.
    pub config: ScanConfig,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub counts: StatusCounts,
    /// One entry per requested port, ascending by port.
    pub results: Vec<ProbeResult>,
}

impl ScanReport {
    /// Open a report for a scan that is starting now.
    pub fn begin(target: ScanTarget, config: ScanConfig) -> Self {
        let now = Utc::now();
        Self {
            id: ScanId::new(),
            target,
            config,
            started_at: now,
            finished_at: now,
            counts: StatusCounts::default(),
            results: Vec::new(),
        }
    }

    /// Close the report with the scan's results.
    pub fn finalize(mut self, mut results: Vec<ProbeResult>) -> Self {
        results.sort_by_key(|r| r.port);
        self.counts = StatusCounts::tally(&results);
        self.results = results;
        self.finished_at = Utc::now();
        self
    }

    /// Wall-clock time between start and finish.
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    pub fn open_ports(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.is_open())
    }

    /// Whether the overall deadline cut the scan short.
    pub fn deadline_exceeded(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.detail.as_deref() == Some(DEADLINE_EXCEEDED))
    }

    /// One-line summary for history listings.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} open, {} closed, {} filtered, {} error [{:.2}s]",
            self.target,
            self.counts.open,
            self.counts.closed,
            self.counts.filtered,
            self.counts.error,
            self.duration().as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;
    use std::net::{IpAddr, Ipv4Addr};

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    fn target() -> ScanTarget {
        ScanTarget::new("example.com", IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))
    }

    #[test]
    fn test_finalize_sorts_and_counts() {
        let config = ScanConfig::new([port(22), port(80), port(443), port(8080)]);
        let results = vec![
            ProbeResult::new(port(443), ProbeStatus::Open, Duration::from_millis(12)),
            ProbeResult::new(port(22), ProbeStatus::Closed, Duration::from_millis(1)),
            ProbeResult::error(port(8080), Duration::ZERO, DEADLINE_EXCEEDED),
            ProbeResult::new(port(80), ProbeStatus::Open, Duration::from_millis(9)),
        ];

        let report = ScanReport::begin(target(), config).finalize(results);

        let order: Vec<u16> = report.results.iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(order, vec![22, 80, 443, 8080]);
        assert_eq!(
            report.counts,
            StatusCounts {
                open: 2,
                closed: 1,
                filtered: 0,
                error: 1
            }
        );
        assert_eq!(report.counts.total(), 4);
        assert_eq!(report.open_ports().count(), 2);
        assert!(report.deadline_exceeded());
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn test_summary() {
        let config = ScanConfig::new([port(80)]);
        let report = ScanReport::begin(target(), config).finalize(vec![ProbeResult::new(
            port(80),
            ProbeStatus::Filtered,
            Duration::from_secs(1),
        )]);

        assert!(!report.deadline_exceeded());
        assert!(report
            .summary()
            .starts_with("example.com (93.184.216.34) - 0 open, 0 closed, 1 filtered, 0 error"));
    }

    #[test]
    fn test_report_json_roundtrip() {
        let config = ScanConfig::new([port(80)]);
        let report = ScanReport::begin(target(), config).finalize(vec![ProbeResult::new(
            port(80),
            ProbeStatus::Open,
            Duration::from_millis(4),
        )]);

        let json = serde_json::to_string(&report).unwrap();
        let parsed: ScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, report.id);
        assert_eq!(parsed.results, report.results);
        assert_eq!(parsed.counts, report.counts);
    }
}
