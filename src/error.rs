//! Error types for voyage-batch
//!
//! This module defines the error hierarchy for the three batch stages:
//! - Archive extraction errors (recoverable, isolated per archive)
//! - Merge errors (fatal to the whole merge)
//! - Split errors (fatal to the whole split)
//! - Configuration and worker pool errors
//!
//! Only extraction failures are isolated. Everything else halts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the batch tools
#[derive(Error, Debug)]
pub enum BatchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Merge errors
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Split errors
    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    /// Worker pool errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (directory listing, output directory creation)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Input folder does not exist
    #[error("The folder path '{path}' does not exist")]
    InputDirNotFound { path: PathBuf },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid chunk size
    #[error("Invalid chunk size {size}: must be at least 1 row")]
    InvalidChunkSize { size: usize },

    /// Key column name is empty
    #[error("Key column name must not be empty")]
    EmptyKeyColumn,
}

/// Errors extracting a single archive
///
/// These never abort the run; the worker records them and moves on.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Archive file could not be opened
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a zip file, or the archive is corrupted
    #[error("'{path}' is not a zip file or it is corrupted: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Members could not be written to the output folder
    #[error("Error extracting '{path}': {reason}")]
    Extract { path: PathBuf, reason: String },

    /// The zip reader panicked on this archive
    #[error("Extraction of '{path}' panicked: {message}")]
    Panicked { path: PathBuf, message: String },
}

impl ExtractError {
    /// Build an error from a zip failure, separating corrupt archives from
    /// failures while writing members out
    pub fn from_zip(path: PathBuf, err: zip::result::ZipError) -> Self {
        use zip::result::ZipError;

        match err {
            ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_) => ExtractError::Corrupt {
                path,
                reason: err.to_string(),
            },
            other => ExtractError::Extract {
                path,
                reason: other.to_string(),
            },
        }
    }

    /// Check if the archive itself was unreadable
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ExtractError::Corrupt { .. })
    }
}

/// Errors merging delimited files into the output CSV
#[derive(Error, Debug)]
pub enum MergeError {
    /// A source file could not be opened
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be parsed
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row had more fields than the file header
    #[error("Malformed row in '{path}' at line {line}: expected {expected} fields, saw {found}")]
    RowTooWide {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A source file had no header row
    #[error("No columns to parse from '{path}'")]
    EmptySource { path: PathBuf },

    /// The merged output could not be written
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors splitting a CSV by key column
#[derive(Error, Debug)]
pub enum SplitError {
    /// Input file does not exist
    #[error("The file '{path}' was not found")]
    InputNotFound { path: PathBuf },

    /// Input file could not be read as CSV
    #[error("Error loading the data from '{path}': {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row had more fields than the header
    #[error("Error loading the data from '{path}': line {line} has {found} fields, expected {expected}")]
    RowTooWide {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Key column missing from the header
    #[error("Column '{column}' not found in '{path}'")]
    MissingColumn { column: String, path: PathBuf },

    /// A split file could not be written
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Worker pool errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be started
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Task could not be queued
    #[error("Failed to queue archive task: queue closed")]
    QueueSendFailed,
}

/// Result type alias for BatchError
pub type Result<T> = std::result::Result<T, BatchError>;

/// Result type alias for MergeError
pub type MergeResult<T> = std::result::Result<T, MergeError>;

/// Result type alias for SplitError
pub type SplitResult<T> = std::result::Result<T, SplitError>;

/// Represents the outcome of extracting a single archive
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// All members were written to the output folder
    Extracted {
        path: PathBuf,
        members: u64,
        bytes: u64,
    },

    /// Archive was skipped
    Failed { path: PathBuf, error: ExtractError },
}
