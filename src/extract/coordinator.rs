//! Extraction coordinator - orchestrates the parallel archive fan-out
//!
//! The coordinator is responsible for:
//! - Discovering archives in the input folder
//! - Creating the shared output folder
//! - Seeding the queue and spawning a fixed-size worker pool
//! - Joining every worker and collecting per-archive outcomes

use crate::config::{ExtractConfig, ARCHIVE_EXTENSION};
use crate::error::{ArchiveOutcome, ExtractError, Result};
use crate::extract::queue::ArchiveQueue;
use crate::extract::worker::{aggregate_stats, ExtractTotals, Worker};
use crate::scan::list_with_extension;
use crossbeam_channel::unbounded;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of a completed extraction run
#[derive(Debug, Default)]
pub struct ExtractResult {
    /// Archives found in the input folder
    pub archives_found: u64,

    /// Archives extracted successfully
    pub extracted: u64,

    /// Archives skipped (corrupt, unreadable, or lost to a worker panic)
    pub failed: u64,

    /// Member files written
    pub members: u64,

    /// Uncompressed bytes written
    pub bytes: u64,

    /// Errors for each skipped archive
    pub failures: Vec<ExtractError>,

    /// Time taken for the run
    pub duration: Duration,
}

impl ExtractResult {
    /// Check every archive was extracted
    pub fn all_extracted(&self) -> bool {
        self.extracted == self.archives_found
    }
}

/// Coordinates the parallel extraction of every archive in a folder
pub struct ExtractCoordinator {
    /// Configuration
    config: Arc<ExtractConfig>,

    /// Archives discovered in the input folder
    archives: Vec<PathBuf>,

    /// Worker threads
    workers: Vec<Worker>,
}

impl ExtractCoordinator {
    /// Create a coordinator and discover the archives to extract
    pub fn new(config: ExtractConfig) -> Result<Self> {
        config.validate()?;
        let archives = list_with_extension(&config.input_dir, ARCHIVE_EXTENSION)?;

        Ok(Self {
            config: Arc::new(config),
            archives,
            workers: Vec::new(),
        })
    }

    /// Archives that will be extracted
    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }

    /// Run the extraction
    pub fn run(mut self) -> Result<ExtractResult> {
        let start_time = Instant::now();

        if self.archives.is_empty() {
            info!(
                folder = %self.config.input_dir.display(),
                "No zip files found in the specified folder"
            );
            return Ok(ExtractResult {
                duration: start_time.elapsed(),
                ..Default::default()
            });
        }

        fs::create_dir_all(&self.config.output_dir)?;

        let pool_size = self.config.worker_count.min(self.archives.len());
        info!(
            archives = self.archives.len(),
            workers = pool_size,
            output = %self.config.output_dir.display(),
            "Starting extraction"
        );

        let mut queue = ArchiveQueue::new(self.archives.len());
        queue.seed(&self.archives)?;
        queue.close();

        let (outcome_tx, outcome_rx) = unbounded();
        let output_dir = Arc::new(self.config.output_dir.clone());

        for id in 0..pool_size {
            let worker = Worker::spawn(
                id,
                Arc::clone(&output_dir),
                queue.receiver(),
                outcome_tx.clone(),
            )?;
            self.workers.push(worker);
        }
        drop(outcome_tx);

        let totals = self.join_workers();

        let failures: Vec<ExtractError> = outcome_rx
            .try_iter()
            .filter_map(|outcome| match outcome {
                ArchiveOutcome::Failed { error, .. } => Some(error),
                ArchiveOutcome::Extracted { .. } => None,
            })
            .collect();

        let archives_found = self.archives.len() as u64;
        let duration = start_time.elapsed();

        info!(
            extracted = totals.archives,
            failed = archives_found - totals.archives,
            members = totals.members,
            bytes = totals.bytes,
            duration_ms = duration.as_millis() as u64,
            "Extraction completed"
        );

        Ok(ExtractResult {
            archives_found,
            extracted: totals.archives,
            failed: archives_found - totals.archives,
            members: totals.members,
            bytes: totals.bytes,
            failures,
            duration,
        })
    }

    /// Join all worker threads and collect final stats
    fn join_workers(&mut self) -> ExtractTotals {
        let workers = std::mem::take(&mut self.workers);
        let stats: Vec<_> = workers.iter().map(Worker::stats).collect();

        for worker in workers {
            let id = worker.id();
            if let Err(e) = worker.join() {
                warn!(worker = id, error = %e, "Worker failed to join cleanly");
            }
        }

        aggregate_stats(&stats)
    }
}
