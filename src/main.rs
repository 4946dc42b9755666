//! unzip-to-csv - extract a folder of zip archives and merge the
//! pipe-delimited text files into one CSV
//!
//! Entry point for the extract + merge pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use voyage_batch::config::{PipelineArgs, PipelineConfig};
use voyage_batch::extract::ExtractCoordinator;
use voyage_batch::logging::setup_logging;
use voyage_batch::merge::merge_directory;
use voyage_batch::summary::{print_header, print_pipeline_summary};

fn main() -> ExitCode {
    // Usage errors exit 1; --help and --version exit 0
    let args = match PipelineArgs::try_parse() {
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

fn run(args: PipelineArgs) -> Result<()> {
    let config = PipelineConfig::from_args(args).context("Invalid configuration")?;

    print_header(
        "unzip-to-csv",
        &[
            ("Source", config.extract.input_dir.display().to_string()),
            ("Workers", config.extract.worker_count.to_string()),
            ("Output", config.extract.output_dir.display().to_string()),
            ("Merged", config.merge.output_path.display().to_string()),
        ],
    );

    info!(folder = %config.extract.output_dir.display(), "Using output folder");
    fs::create_dir_all(&config.extract.output_dir).with_context(|| {
        format!(
            "Failed to create output folder '{}'",
            config.extract.output_dir.display()
        )
    })?;

    let start = Instant::now();

    let extract = ExtractCoordinator::new(config.extract.clone())
        .context("Failed to list zip folder")?
        .run()
        .context("Extraction failed")?;

    let merge = merge_directory(&config.merge).context("Merge failed")?;

    print_pipeline_summary(&extract, &merge, start.elapsed());

    if extract.all_extracted() {
        info!("Process completed");
    } else {
        info!(skipped = extract.failed, "Process completed with skipped archives");
    }

    Ok(())
}
