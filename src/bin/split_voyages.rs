//! split-voyages - split a CSV into one file per ShipVoyage value

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use voyage_batch::config::{SplitArgs, SplitConfig};
use voyage_batch::logging::setup_logging;
use voyage_batch::split::split_by_key;
use voyage_batch::summary::{print_header, print_split_summary};

fn main() -> ExitCode {
    let args = match SplitArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    setup_logging();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: SplitArgs) -> Result<()> {
    let config = SplitConfig::from_args(args).context("Invalid configuration")?;

    print_header(
        "split-voyages",
        &[
            ("Input", config.input_path.display().to_string()),
            ("Key", config.key_column.clone()),
            ("Output", config.output_dir.display().to_string()),
        ],
    );

    let report = split_by_key(&config)?;

    print_split_summary(&report, &config.output_dir);
    info!(
        voyages = report.voyage_count(),
        "Total voyages split into separate CSV files"
    );

    Ok(())
}
