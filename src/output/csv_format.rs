//! CSV output formatting.

use super::plain::visible;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write one row per shown port.
pub fn write_csv<W: Write>(out: W, report: &ScanReport, show_closed: bool) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "status", "elapsed_ms", "detail"])?;
    for result in visible(report, show_closed) {
        wtr.write_record([
            result.port.to_string().as_str(),
            result.status.to_string().as_str(),
            result.elapsed.as_millis().to_string().as_str(),
            result.detail.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ProbeResult, ProbeStatus, ScanConfig};
    use crate::types::{Port, ScanTarget};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    #[test]
    fn test_csv_rows() {
        let p = |n| Port::new(n).unwrap();
        let target = ScanTarget::new("127.0.0.1", IpAddr::V4(Ipv4Addr::LOCALHOST));
        let report = ScanReport::begin(target, ScanConfig::new([p(22), p(80), p(81)])).finalize(
            vec![
                ProbeResult::new(p(80), ProbeStatus::Open, Duration::from_millis(3)),
                ProbeResult::new(p(22), ProbeStatus::Closed, Duration::from_millis(1)),
                ProbeResult::error(p(81), Duration::from_millis(2), "no route, to host"),
            ],
        );

        let mut buf = Vec::new();
        write_csv(&mut buf, &report, false).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "port,status,elapsed_ms,detail\n80,open,3,\n81,error,2,\"no route, to host\"\n"
        );
    }
}
