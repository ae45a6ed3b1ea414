//! History and show subcommands.

use crate::cli::{Context, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::storage::ScanStore;
use clap::Parser;
use std::io;

/// View and manage scan history.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Number of recent scans to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,

    /// Show open ports for each scan
    #[arg(long)]
    pub detailed: bool,

    /// Delete all saved scans
    #[arg(long, conflicts_with = "prune")]
    pub clear: bool,

    /// Delete scans older than this many days
    #[arg(long, value_name = "DAYS")]
    pub prune: Option<u32>,
}

impl HistoryCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ScanStore::new()?;

        if self.clear {
            let removed = store.clear()?;
            if !ctx.quiet {
                output::print_success(&format!("Removed {removed} saved scans"));
            }
            return Ok(());
        }

        if let Some(days) = self.prune {
            let removed = store.prune(chrono::Duration::days(i64::from(days)))?;
            if !ctx.quiet {
                output::print_success(&format!(
                    "Removed {removed} scans older than {days} days"
                ));
            }
            return Ok(());
        }

        let reports = store.list_recent(self.count)?;
        output::write_history(&mut io::stdout().lock(), &reports, self.detailed)?;
        Ok(())
    }
}

/// Display a saved scan.
#[derive(Parser, Debug)]
pub struct ShowCommand {
    /// Full scan ID or a unique prefix of it
    #[arg(value_name = "SCAN_ID")]
    pub scan_id: String,

    /// Output format for results
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Show closed ports in plain and CSV output
    #[arg(long)]
    pub show_closed: bool,
}

impl ShowCommand {
    pub fn execute(&self, _ctx: &Context) -> CliResult<()> {
        let report = ScanStore::new()?.find(&self.scan_id)?;
        output::print_report(&report, self.output, self.show_closed)?;
        Ok(())
    }
}
