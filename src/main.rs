use anyhow::Context as _;
use clap::Parser;
use nettrackr::cli::{Cli, Context};
use nettrackr::{logging, output};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.load_settings().context("failed to load settings")?;
    let _log_guard = logging::init(&settings, cli.verbose, cli.quiet);

    let ctx = Context {
        settings,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    cli.execute(&ctx).await?;
    Ok(())
}
