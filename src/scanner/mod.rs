//! Port scan engine.
//!
//! Resolves the target once, then runs a bounded pool of tokio workers that
//! pull ports from a shared queue and probe them. Workers hand results to the
//! engine over a channel; the engine is the channel's only reader, so no
//! collection is ever written from two tasks.
//!
//! Every requested port ends up with exactly one [`ProbeResult`]. Ports the
//! overall deadline cut off are recorded as `error` with
//! [`DEADLINE_EXCEEDED`] rather than left out.

pub mod rate_limiter;
pub mod report;
pub mod tcp;
pub mod traits;

pub use rate_limiter::RateLimiter;
pub use report::{ScanReport, StatusCounts, DEADLINE_EXCEEDED};
pub use tcp::TcpConnectProber;
pub use traits::{
    ProbeResult, ProbeStatus, Prober, ScanConfig, DEFAULT_CONCURRENCY_CEILING,
    DEFAULT_PROBE_TIMEOUT,
};

use crate::error::ScanResult;
use crate::types::{Port, ScanTarget};
use indicatif::ProgressBar;
use std::collections::{BTreeMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Detail for a port whose worker died without reporting.
const PROBE_LOST: &str = "probe task ended without a result";

/// Scan `host` with TCP connect probes.
///
/// Fails only if the config breaks its invariants or the host cannot be
/// resolved; in both cases no probe is sent.
pub async fn scan(host: &str, config: &ScanConfig) -> ScanResult<ScanReport> {
    ScanEngine::new().scan(host, config).await
}

/// Runs scans with a given [`Prober`].
pub struct ScanEngine<P = TcpConnectProber> {
    prober: Arc<P>,
    progress: Option<ProgressBar>,
}

impl ScanEngine<TcpConnectProber> {
    pub fn new() -> Self {
        Self::with_prober(TcpConnectProber::new())
    }
}

impl Default for ScanEngine<TcpConnectProber> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Prober + 'static> ScanEngine<P> {
    pub fn with_prober(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            progress: None,
        }
    }

    /// Tick `progress` once per finished port.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Resolve `host`, then probe every port in `config`.
    pub async fn scan(&self, host: &str, config: &ScanConfig) -> ScanResult<ScanReport> {
        config.validate()?;
        let target = ScanTarget::resolve(host).await?;
        self.scan_target(target, config).await
    }

    /// Probe every port in `config` on an already resolved target.
    pub async fn scan_target(
        &self,
        target: ScanTarget,
        config: &ScanConfig,
    ) -> ScanResult<ScanReport> {
        config.validate()?;
        Ok(self.run(target, normalized(config)).await)
    }

    async fn run(&self, target: ScanTarget, config: ScanConfig) -> ScanReport {
        let address = target.address;
        let ports = config.ports.clone();
        let worker_count = config.max_concurrency.min(ports.len());
        let probe_timeout = config.probe_timeout;
        let deadline = config.overall_deadline;
        let limiter = config.rate_limit.and_then(RateLimiter::new);

        info!(
            target = %target,
            ports = ports.len(),
            workers = worker_count,
            timeout_ms = probe_timeout.as_millis() as u64,
            "starting scan"
        );
        let report = ScanReport::begin(target, config);

        let queue = Arc::new(WorkQueue::new(ports.iter().copied()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();
        for worker in 0..worker_count {
            workers.spawn(run_worker(
                worker,
                address,
                probe_timeout,
                Arc::clone(&queue),
                Arc::clone(&self.prober),
                limiter.clone(),
                tx.clone(),
            ));
        }
        // Workers hold the only senders; the channel closes when the last exits.
        drop(tx);

        let mut collector = Collector::new(self.progress.clone());
        let drain = async {
            while let Some(result) = rx.recv().await {
                collector.record(result);
            }
        };

        let timed_out = match deadline {
            Some(limit) => timeout(limit, drain).await.is_err(),
            None => {
                drain.await;
                false
            }
        };

        if timed_out {
            warn!(
                remaining = queue.len(),
                "scan deadline exceeded, abandoning in-flight probes"
            );
            workers.abort_all();
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if !e.is_cancelled() {
                    warn!(error = %e, "scan worker failed");
                }
            }
        }
        // Results sent after the drain stopped listening are still complete.
        while let Ok(result) = rx.try_recv() {
            collector.record(result);
        }

        let missing_detail = if timed_out {
            DEADLINE_EXCEEDED
        } else {
            PROBE_LOST
        };
        let results = collector.into_results(&ports, missing_detail);

        if let Some(pb) = &self.progress {
            pb.finish_with_message("scan complete");
        }

        let report = report.finalize(results);
        info!(
            open = report.counts.open,
            closed = report.counts.closed,
            filtered = report.counts.filtered,
            error = report.counts.error,
            "scan finished"
        );
        report
    }
}

/// Copy of `config` with ports sorted and deduplicated.
fn normalized(config: &ScanConfig) -> ScanConfig {
    let mut config = config.clone();
    config.ports.sort_unstable();
    config.ports.dedup();
    config
}

async fn run_worker<P: Prober>(
    worker: usize,
    address: IpAddr,
    probe_timeout: Duration,
    queue: Arc<WorkQueue>,
    prober: Arc<P>,
    limiter: Option<RateLimiter>,
    results: mpsc::UnboundedSender<ProbeResult>,
) {
    while let Some(port) = queue.pop() {
        if let Some(limiter) = &limiter {
            limiter.wait().await;
        }

        let result = prober.probe(address, port, probe_timeout).await;
        debug!(
            worker,
            %port,
            status = %result.status,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "probe finished"
        );

        if results.send(result).is_err() {
            break;
        }
    }
}

/// Ports waiting for a probe, shared by all workers.
struct WorkQueue {
    ports: Mutex<VecDeque<Port>>,
}

impl WorkQueue {
    fn new(ports: impl IntoIterator<Item = Port>) -> Self {
        Self {
            ports: Mutex::new(ports.into_iter().collect()),
        }
    }

    fn pop(&self) -> Option<Port> {
        self.ports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn len(&self) -> usize {
        self.ports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Results received so far, keyed by port.
struct Collector {
    results: BTreeMap<Port, ProbeResult>,
    progress: Option<ProgressBar>,
}

impl Collector {
    fn new(progress: Option<ProgressBar>) -> Self {
        Self {
            results: BTreeMap::new(),
            progress,
        }
    }

    fn record(&mut self, result: ProbeResult) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
            if result.is_open() {
                pb.set_message(format!("found open port {}", result.port));
            }
        }
        self.results.insert(result.port, result);
    }

    /// Exactly one result per requested port, in port order.
    fn into_results(mut self, ports: &[Port], missing_detail: &str) -> Vec<ProbeResult> {
        ports
            .iter()
            .map(|&port| {
                self.results
                    .remove(&port)
                    .unwrap_or_else(|| ProbeResult::error(port, Duration::ZERO, missing_detail))
            })
            .collect()
    }
}
