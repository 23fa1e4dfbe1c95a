use clap::Parser;
use std::process::ExitCode;
use tracing::info;

mod cli;
mod config;
mod core;
mod logging;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = logging::setup_logging(cli::log_level(&cli), !cli.no_log_file);
    info!(
        "Starting yolo-dataset-tools {} (log file: {:?})",
        env!("CARGO_PKG_VERSION"),
        log_path
    );

    cli::run(&cli)
}
