//! Terminal header and run summaries
//!
//! Status lines for individual files go through `tracing`; this module only
//! prints the framed start banner and the end-of-run totals.

use crate::extract::ExtractResult;
use crate::merge::MergeReport;
use crate::split::SplitReport;
use console::style;
use humansize::{format_size, BINARY};
use std::path::Path;
use std::time::Duration;

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

fn rule() {
    println!("{}", style("─".repeat(50)).dim());
}

/// Print a header at the start of a run
pub fn print_header(tool: &str, fields: &[(&str, String)]) {
    println!();
    println!(
        "{} {}",
        style(tool).cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    rule();
    for (label, value) in fields {
        println!("  {} {}", style(format!("{}:", label)).bold(), value);
    }
    println!();
}

/// Print the totals of an extract + merge run
pub fn print_pipeline_summary(extract: &ExtractResult, merge: &MergeReport, total: Duration) {
    println!();
    println!("{}", style("Process completed").green().bold());
    rule();
    println!(
        "  {} {} of {}",
        style("Archives:").bold(),
        format_number(extract.extracted),
        format_number(extract.archives_found)
    );
    println!(
        "  {} {} ({})",
        style("Extracted:").bold(),
        format_number(extract.members),
        format_size(extract.bytes, BINARY)
    );
    if extract.failed > 0 {
        println!(
            "  {} {}",
            style("Skipped:").yellow().bold(),
            format_number(extract.failed)
        );
        for failure in &extract.failures {
            println!("    {}", style(failure).yellow());
        }
    }
    println!(
        "  {} {} files, {} rows",
        style("Merged:").bold(),
        format_number(merge.files_merged),
        format_number(merge.rows_written)
    );
    if merge.output_created {
        print_path("Output:", &merge.output_path);
    }
    println!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        total.as_secs_f64()
    );
    println!();
}

/// Print the totals of a split run
pub fn print_split_summary(report: &SplitReport, output_dir: &Path) {
    println!();
    println!("{}", style("Split complete").green().bold());
    rule();
    println!(
        "  {} {}",
        style("Rows:").bold(),
        format_number(report.total_rows)
    );
    println!(
        "  {} {}",
        style("Voyages:").bold(),
        format_number(report.voyage_count() as u64)
    );
    if report.distinct_files < report.voyage_count() {
        println!(
            "  {} {}",
            style("Files:").bold(),
            format_number(report.distinct_files as u64)
        );
    }
    print_path("Folder:", output_dir);
    println!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        report.duration.as_secs_f64()
    );
    println!();
}

fn print_path(label: &str, path: &Path) {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => println!(
            "  {} {} ({})",
            style(label).bold(),
            path.display(),
            format_size(meta.len(), BINARY)
        ),
        _ => println!("  {} {}", style(label).bold(), path.display()),
    }
}
