use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cashflow_analyzer::cli::Cli;
use cashflow_analyzer::pipeline;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "cashflow_analyzer=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let report = pipeline::run(&cli, chrono::Local::now().date_naive())?;
    print!("{report}");
    Ok(())
}
