//! End-to-end scans against sockets on the loopback interface.

use nettrackr::scanner::DEADLINE_EXCEEDED;
use nettrackr::{scan, Port, ProbeStatus, ResolutionError, ScanConfig, ScanError, ScanTarget};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::net::TcpListener;

async fn open_port() -> (TcpListener, Port) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
    (listener, port)
}

async fn closed_port() -> Port {
    let (listener, port) = open_port().await;
    drop(listener);
    port
}

#[tokio::test]
async fn scan_reports_open_and_closed_ports() {
    let (_listener, open) = open_port().await;
    let closed = closed_port().await;

    let config = ScanConfig::new([closed, open]).with_timeout(Duration::from_millis(500));
    let report = scan("127.0.0.1", &config).await.unwrap();

    assert_eq!(report.target.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(report.results.len(), 2);
    for result in &report.results {
        let expected = if result.port == open {
            ProbeStatus::Open
        } else {
            ProbeStatus::Closed
        };
        assert_eq!(result.status, expected, "port {}", result.port);
    }
    assert!(report.results.windows(2).all(|w| w[0].port < w[1].port));
    assert_eq!(report.counts.open, 1);
    assert_eq!(report.counts.closed, 1);
    assert!(!report.deadline_exceeded());
}

#[tokio::test]
async fn scan_many_ports_serially_and_in_parallel() {
    let mut listeners = Vec::new();
    let mut ports = Vec::new();
    for _ in 0..8 {
        let (listener, port) = open_port().await;
        listeners.push(listener);
        ports.push(port);
    }

    for concurrency in [1, 8] {
        let config = ScanConfig::new(ports.clone()).with_concurrency(concurrency);
        let report = scan("127.0.0.1", &config).await.unwrap();
        assert_eq!(report.counts.open, 8, "concurrency {concurrency}");
    }
}

#[tokio::test]
async fn unresolvable_host_fails_without_report() {
    let config = ScanConfig::new(Port::new(80));

    let err = scan("no-such-host.invalid", &config).await.unwrap_err();

    assert!(matches!(err, ScanError::Resolution(_)), "{err}");
}

#[tokio::test]
async fn tiny_deadline_still_accounts_for_every_port() {
    let config = ScanConfig::new((1..=200).filter_map(Port::new))
        .with_concurrency(1)
        .with_rate_limit(10)
        .with_deadline(Duration::from_millis(50));

    let report = scan("127.0.0.1", &config).await.unwrap();

    assert_eq!(report.results.len(), 200);
    assert!(report.deadline_exceeded());
    let last = report.results.last().unwrap();
    assert_eq!(last.status, ProbeStatus::Error);
    assert_eq!(last.detail.as_deref(), Some(DEADLINE_EXCEEDED));
}

#[test]
fn literal_targets_skip_dns() {
    let target = tokio_test::block_on(ScanTarget::resolve("[::1]")).unwrap();
    assert_eq!(target.address, "::1".parse::<IpAddr>().unwrap());

    let err = tokio_test::block_on(ScanTarget::resolve("bad host")).unwrap_err();
    assert!(matches!(err, ResolutionError::InvalidHost(_)));
}
