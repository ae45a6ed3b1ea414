//! # NetTrackr - Concurrent TCP Port Scanning
//!
//! NetTrackr probes a list of TCP ports on one host with a bounded pool of
//! concurrent workers. Each probe is a full connect with its own timeout;
//! the scan as a whole can be given a deadline and a probe rate limit.
//!
//! Every requested port gets exactly one result, classified as `open`,
//! `closed`, `filtered` or `error`, and results come back sorted by port.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use nettrackr::{ScanConfig, PortSpec};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ports: PortSpec = "22,80,443".parse()?;
//!     let config = ScanConfig::new(ports.to_ports())
//!         .with_timeout(Duration::from_millis(500))
//!         .with_deadline(Duration::from_secs(5));
//!
//!     let report = nettrackr::scan("localhost", &config).await?;
//!     for result in &report.results {
//!         println!("{} {}", result.port, result.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port, target and scan ID newtypes
//! - [`scanner`] - The scan engine, the `Prober` seam and the TCP prober
//! - [`config`] - Settings file and application paths
//! - [`storage`] - Scan history on disk
//! - [`output`] - Plain, JSON and CSV rendering
//! - [`cli`] - Command-line interface
//! - [`logging`] - Tracing subscriber with an optional log file
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod storage;
pub mod types;

pub use error::{CliError, ScanError};
pub use scanner::{scan, ProbeResult, ProbeStatus, Prober, ScanConfig, ScanEngine, ScanReport};
pub use types::{Port, PortSpec, ResolutionError, ScanId, ScanTarget};
