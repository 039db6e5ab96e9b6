//! Spectro Compare - spectrophotometer export cleaning & dorsal/volar comparison
//!
//! Reads a device export (.ods), keeps the complete readings, writes them as CSV
//! and compares dorsal vs. volar sites per color channel with a paired t-test.

mod charts;
mod cli;
mod config;
mod data;
mod pipeline;
mod stats;
#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::Cli;
use log::debug;
use std::process::ExitCode;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<pipeline::RunReport> {
    let config = cli.into_run_config()?;
    debug!("{:?}", config);
    pipeline::run(&config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(report) => {
            println!(
                "Wrote {}, {} and {}",
                report.outputs.table.display(),
                report.outputs.chart.display(),
                report.outputs.summary.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
