//! Scan subcommand implementation.
//!
//! Handles `nettrackr scan <target>`. Flags left unset fall back to the
//! settings file.

use crate::cli::{Context, OutputFormat};
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use crate::scanner::{ScanConfig, ScanEngine};
use crate::storage::ScanStore;
use crate::types::PortSpec;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Scan a target for open TCP ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Host to scan (IPv4, IPv6, or hostname)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports to scan (e.g. "80", "80,443", "1-1000", "22,80,443,8000-9000")
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Per-probe connect timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum probes in flight (default: one per port, capped by settings)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Overall scan deadline in milliseconds; unscanned ports are reported as errors
    #[arg(short = 'd', long, value_name = "MS")]
    pub deadline: Option<u64>,

    /// Maximum probes started per second (0 = unlimited)
    #[arg(short = 'r', long = "rate")]
    pub rate_limit: Option<u32>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Show closed ports in plain and CSV output
    #[arg(long)]
    pub show_closed: bool,

    /// Don't save the scan to history
    #[arg(long)]
    pub no_save: bool,
}

impl ScanCommand {
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let config = self.build_config(&ctx.settings)?;

        if !ctx.quiet {
            output::print_scan_header(
                &self.target,
                config.ports.len(),
                config.max_concurrency.min(config.ports.len()),
                config.probe_timeout.as_millis(),
            );
        }

        let mut engine = ScanEngine::new();
        if ctx.verbose {
            engine = engine.with_progress(progress_bar(config.ports.len()));
        }
        let report = engine.scan(&self.target, &config).await?;

        if ctx.settings.auto_save_scans && !self.no_save {
            match ScanStore::new().and_then(|store| store.save(&report)) {
                Ok(()) if !ctx.quiet => {
                    output::print_info(&format!("Scan saved as {}", report.id.short()))
                }
                Ok(()) => {}
                Err(e) => output::print_warning(&format!("scan not saved to history: {e}")),
            }
        }

        output::print_report(&report, self.output, self.show_closed)?;
        Ok(())
    }

    /// Merge flags over settings into an explicit scan configuration.
    fn build_config(&self, settings: &AppSettings) -> CliResult<ScanConfig> {
        let spec: PortSpec = match &self.ports {
            Some(ports) => ports.parse()?,
            None => settings.port_spec()?,
        };
        let ports = spec.to_ports();

        let concurrency = self
            .concurrency
            .unwrap_or_else(|| ports.len().min(settings.max_concurrency).max(1));
        let timeout = self
            .timeout
            .map(Duration::from_millis)
            .unwrap_or_else(|| settings.probe_timeout());
        let rate = self.rate_limit.unwrap_or(settings.default_rate_limit);
        let deadline = self
            .deadline
            .map(Duration::from_millis)
            .or_else(|| settings.deadline());

        let config = ScanConfig::new(ports)
            .with_timeout(timeout)
            .with_concurrency(concurrency)
            .with_rate_limit(rate);

        Ok(match deadline {
            Some(deadline) => config.with_deadline(deadline),
            None => config,
        })
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
