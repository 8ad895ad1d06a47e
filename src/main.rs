use std::process::ExitCode;

use clap::Parser;
use lambdaforge::cli::{run_cli, Cli};
use lambdaforge::logging::{init_logging, LogConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&LogConfig::from_env()) {
        eprintln!("Warning: {err:#}");
    }

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
