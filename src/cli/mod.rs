//! CLI subcommand definitions and handlers.
//!
//! - `nettrackr scan <target>` - scan a host's TCP ports
//! - `nettrackr history` - list, clear, or prune saved scans
//! - `nettrackr show <scan-id>` - display a saved scan

mod history;
mod scan;

pub use history::{HistoryCommand, ShowCommand};
pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NetTrackr - network information toolkit.
#[derive(Parser, Debug)]
#[command(name = "nettrackr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Network information toolkit with a fast TCP port scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logs and a progress bar)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a settings file to use instead of the default one
    #[arg(long, global = true, value_name = "PATH", env = "NETTRACKR_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target for open TCP ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// View and manage scan history
    #[command(alias = "h")]
    History(HistoryCommand),

    /// Display a saved scan
    Show(ShowCommand),
}

/// Flags every command handler receives.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AppSettings,
    pub verbose: bool,
    pub quiet: bool,
}

impl Cli {
    /// Settings from `--config` or the default location.
    pub fn load_settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }

    pub async fn execute(self, ctx: &Context) -> CliResult<()> {
        match self.command {
            Commands::Scan(cmd) => cmd.execute(ctx).await,
            Commands::History(cmd) => cmd.execute(ctx),
            Commands::Show(cmd) => cmd.execute(ctx),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Plain,
    /// The full report as JSON
    Json,
    /// One CSV row per port
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
