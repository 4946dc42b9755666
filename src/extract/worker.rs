//! Worker thread logic for parallel archive extraction
//!
//! Each worker:
//! - Pulls archive tasks from the shared queue
//! - Extracts every member into the shared output folder
//! - Reports one outcome per archive; a bad archive never stops the worker

use crate::error::{ArchiveOutcome, ExtractError, WorkerError};
use crate::extract::queue::ArchiveQueueReceiver;
use crossbeam_channel::Sender;
use std::any::Any;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Archives extracted successfully
    pub archives_extracted: AtomicU64,

    /// Member files written
    pub members_extracted: AtomicU64,

    /// Uncompressed bytes written
    pub bytes_extracted: AtomicU64,

    /// Archives skipped because of an error
    pub failures: AtomicU64,
}

impl WorkerStats {
    fn record_archive(&self, members: u64, bytes: u64) {
        self.archives_extracted.fetch_add(1, Ordering::Relaxed);
        self.members_extracted.fetch_add(members, Ordering::Relaxed);
        self.bytes_extracted.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Totals across all workers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractTotals {
    pub archives: u64,
    pub members: u64,
    pub bytes: u64,
    pub failures: u64,
}

/// A worker thread that extracts archives
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        output_dir: Arc<PathBuf>,
        queue_rx: ArchiveQueueReceiver,
        outcomes: Sender<ArchiveOutcome>,
    ) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("extract-{}", id))
            .spawn(move || worker_loop(id, &output_dir, queue_rx, outcomes, &stats_clone))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get a handle to the worker statistics, readable after `join`
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::Panicked {
                id: self.id,
                message: "Worker thread panicked".into(),
            }),
            None => Ok(()),
        }
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    output_dir: &Path,
    queue_rx: ArchiveQueueReceiver,
    outcomes: Sender<ArchiveOutcome>,
    stats: &WorkerStats,
) {
    debug!(worker = id, "Worker starting");

    while let Some(task) = queue_rx.recv() {
        let outcome = extract_archive(&task.path, output_dir);

        match &outcome {
            ArchiveOutcome::Extracted {
                path,
                members,
                bytes,
            } => {
                stats.record_archive(*members, *bytes);
                info!(
                    worker = id,
                    archive = %path.display(),
                    output = %output_dir.display(),
                    members = members,
                    "Unzipped archive"
                );
            }
            ArchiveOutcome::Failed { path, error } => {
                stats.record_failure();
                warn!(
                    worker = id,
                    archive = %path.display(),
                    corrupt = error.is_corrupt(),
                    error = %error,
                    "Archive skipped"
                );
            }
        }

        // Coordinator may have stopped listening; the stats still count it
        let _ = outcomes.send(outcome);
    }

    debug!(worker = id, "Worker finished");
}

/// Extract every member of one archive into `output_dir`
///
/// Members whose names would escape `output_dir` are skipped. Files with
/// the same name from different archives overwrite each other. A panic
/// inside the zip reader fails this archive only.
pub fn extract_archive(path: &Path, output_dir: &Path) -> ArchiveOutcome {
    run_guarded(path, || try_extract(path, output_dir))
}

fn run_guarded<F>(path: &Path, extract: F) -> ArchiveOutcome
where
    F: FnOnce() -> Result<(u64, u64), ExtractError>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(extract)).unwrap_or_else(|payload| {
        Err(ExtractError::Panicked {
            path: path.to_path_buf(),
            message: panic_message(payload.as_ref()),
        })
    });

    match result {
        Ok((members, bytes)) => ArchiveOutcome::Extracted {
            path: path.to_path_buf(),
            members,
            bytes,
        },
        Err(error) => ArchiveOutcome::Failed {
            path: path.to_path_buf(),
            error,
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn try_extract(path: &Path, output_dir: &Path) -> Result<(u64, u64), ExtractError> {
    let file = File::open(path).map_err(|source| ExtractError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| ExtractError::from_zip(path.to_path_buf(), e))?;

    let mut members = 0u64;
    let mut bytes = 0u64;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ExtractError::from_zip(path.to_path_buf(), e))?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(
                archive = %path.display(),
                member = entry.name(),
                "Skipping member with unsafe path"
            );
            continue;
        };
        let target = output_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| write_error(path, &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| write_error(path, parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| write_error(path, &target, e))?;
        bytes += io::copy(&mut entry, &mut out).map_err(|e| write_error(path, &target, e))?;
        members += 1;
    }

    Ok((members, bytes))
}

fn write_error(archive: &Path, target: &Path, err: io::Error) -> ExtractError {
    ExtractError::Extract {
        path: archive.to_path_buf(),
        reason: format!("{}: {}", target.display(), err),
    }
}

/// Sum the statistics of every worker
pub fn aggregate_stats(stats: &[Arc<WorkerStats>]) -> ExtractTotals {
    stats.iter().fold(ExtractTotals::default(), |mut acc, s| {
        acc.archives += s.archives_extracted.load(Ordering::Relaxed);
        acc.members += s.members_extracted.load(Ordering::Relaxed);
        acc.bytes += s.bytes_extracted.load(Ordering::Relaxed);
        acc.failures += s.failures.load(Ordering::Relaxed);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, body) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_valid_archive() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("a.txt", "x|y\n1|2\n"), ("b.txt", "x|y\n")]);

        let outcome = extract_archive(&archive, &out);
        match outcome {
            ArchiveOutcome::Extracted { members, bytes, .. } => {
                assert_eq!(members, 2);
                assert_eq!(bytes, 12);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "x|y\n1|2\n");
        assert!(out.join("b.txt").exists());
    }

    #[test]
    fn test_unsafe_member_path_is_skipped() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let archive = dir.path().join("mixed.zip");
        write_zip(&archive, &[("sub/x.txt", "a|b\n"), ("../evil.txt", "x")]);

        match extract_archive(&archive, &out) {
            ArchiveOutcome::Extracted { members, .. } => assert_eq!(members, 1),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(fs::read_to_string(out.join("sub/x.txt")).unwrap(), "a|b\n");
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn test_panic_fails_only_that_archive() {
        let outcome = run_guarded(Path::new("hostile.zip"), || panic!("bad central directory"));
        match outcome {
            ArchiveOutcome::Failed {
                error: ExtractError::Panicked { path, message },
                ..
            } => {
                assert_eq!(path, PathBuf::from("hostile.zip"));
                assert_eq!(message, "bad central directory");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_archive_is_reported() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("b.zip");
        fs::write(&archive, b"definitely not a zip file").unwrap();

        match extract_archive(&archive, dir.path()) {
            ArchiveOutcome::Failed { error, .. } => assert!(error.is_corrupt()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_missing_archive_is_open_error() {
        let dir = tempdir().unwrap();
        match extract_archive(&dir.path().join("gone.zip"), dir.path()) {
            ArchiveOutcome::Failed { error, .. } => {
                assert!(matches!(error, ExtractError::Open { .. }))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
