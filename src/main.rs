use std::process::ExitCode;

use clap::Parser;
use tolgee_extract::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Arguments::parse();

    if let Err(err) = init_tracing(args.verbose()) {
        eprintln!("Error: {:#}", err);
        return ExitStatus::Error.into();
    }

    match tolgee_extract::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}

/// Log to stderr; `TOLGEE_EXTRACT_LOG` takes precedence over `-v`.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter =
        EnvFilter::try_from_env("TOLGEE_EXTRACT_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
