//! Probe abstraction and the values that flow through the engine.
//!
//! The scheduler only talks to a [`Prober`], so it can be driven by the real
//! TCP prober or by a scripted one in tests.

use crate::error::{ScanError, ScanResult};
use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Per-probe timeout used when the caller does not pick one.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Ceiling for the default concurrency (one worker per port up to this).
pub const DEFAULT_CONCURRENCY_CEILING: usize = 500;

/// Outcome of probing a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// Connection established (and immediately closed).
    Open,
    /// Connection actively refused.
    Closed,
    /// No answer before the probe timeout.
    Filtered,
    /// Any other fault; see the result's detail.
    Error,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Result of probing one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub port: Port,
    pub status: ProbeStatus,
    /// Time from connect attempt to outcome.
    #[serde(rename = "elapsed_ms", with = "duration_ms")]
    pub elapsed: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProbeResult {
    pub fn new(port: Port, status: ProbeStatus, elapsed: Duration) -> Self {
        Self {
            port,
            status,
            elapsed,
            detail: None,
        }
    }

    /// An `error` result carrying `detail`.
    pub fn error(port: Port, elapsed: Duration, detail: impl Into<String>) -> Self {
        Self {
            port,
            status: ProbeStatus::Error,
            elapsed,
            detail: Some(detail.into()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ProbeStatus::Open
    }
}

/// Parameters of a single scan.
///
/// Passed explicitly into every scan; nothing here is read from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Ports to probe, ascending and unique once built through [`ScanConfig::new`].
    pub ports: Vec<Port>,
    /// Deadline for each individual connect attempt.
    #[serde(rename = "probe_timeout_ms", with = "duration_ms")]
    pub probe_timeout: Duration,
    /// Upper bound on probes in flight at once.
    pub max_concurrency: usize,
    /// Deadline for the whole scan, measured from the first probe.
    #[serde(
        rename = "overall_deadline_ms",
        default,
        with = "option_duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_deadline: Option<Duration>,
    /// Maximum probes started per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
}

impl ScanConfig {
    /// Build a config with default timeout and concurrency for `ports`.
    pub fn new(ports: impl IntoIterator<Item = Port>) -> Self {
        let mut ports: Vec<Port> = ports.into_iter().collect();
        ports.sort_unstable();
        ports.dedup();

        let max_concurrency = ports.len().clamp(1, DEFAULT_CONCURRENCY_CEILING);
        Self {
            ports,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            max_concurrency,
            overall_deadline: None,
            rate_limit: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = concurrency;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.overall_deadline = Some(deadline);
        self
    }

    /// Cap probe starts per second; zero removes the cap.
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.rate_limit = (per_second > 0).then_some(per_second);
        self
    }

    /// Check the invariants: concurrency >= 1 and timeout > 0.
    pub fn validate(&self) -> ScanResult<()> {
        if self.max_concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "max concurrency must be at least 1".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "probe timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single-port probe strategy.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `port` on `address` once, giving up after `timeout`.
    ///
    /// Never fails: every outcome, including I/O faults, is a [`ProbeResult`].
    async fn probe(&self, address: IpAddr, port: Port, timeout: Duration) -> ProbeResult;
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => super::duration_ms::serialize(d, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}
