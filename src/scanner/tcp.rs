//! TCP connect prober.
//!
//! Performs an ordinary `connect()` through the operating system's socket API,
//! so no elevated privileges are needed. An established connection is dropped
//! right away; nothing is sent or read.

use crate::scanner::traits::{ProbeResult, ProbeStatus, Prober};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Prober using full TCP handshakes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProber;

impl TcpConnectProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, address: IpAddr, port: Port, limit: Duration) -> ProbeResult {
        let addr = SocketAddr::new(address, port.as_u16());
        let start = Instant::now();

        match timeout(limit, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                ProbeResult::new(port, ProbeStatus::Open, start.elapsed())
            }
            Ok(Err(e)) => classify(port, start.elapsed(), &e),
            Err(_) => ProbeResult::new(port, ProbeStatus::Filtered, start.elapsed()),
        }
    }
}

/// Map a failed connect to a probe outcome.
fn classify(port: Port, elapsed: Duration, err: &io::Error) -> ProbeResult {
    match err.kind() {
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
            ProbeResult::new(port, ProbeStatus::Closed, elapsed)
        }
        // Some platforms surface the kernel's own connect timeout before ours.
        io::ErrorKind::TimedOut => ProbeResult::new(port, ProbeStatus::Filtered, elapsed),
        _ => ProbeResult::error(port, elapsed, err.to_string()),
    }
}
