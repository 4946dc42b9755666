//! Configuration types for voyage-batch
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros (positional only)
//! - Runtime configuration with validation
//! - Fixed file-format constants shared by the stages

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Rows per merge chunk
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Field delimiter of the extracted source records
pub const SOURCE_DELIMITER: u8 = b'|';

/// Extension of the archives to extract
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Extension of the delimited files to merge
pub const SOURCE_EXTENSION: &str = "txt";

/// Column used to partition rows by the splitter
pub const KEY_COLUMN: &str = "ShipVoyage";

/// Prefix of every split output file
pub const SPLIT_FILE_PREFIX: &str = "ShipVoyage";

/// Extract every zip archive in a folder, then merge the extracted
/// pipe-delimited text files into one CSV
#[derive(Parser, Debug, Clone)]
#[command(
    name = "unzip-to-csv",
    version,
    about = "Extract zip archives in parallel and merge the pipe-delimited text files into one CSV",
    after_help = "EXAMPLES:\n    \
        unzip-to-csv ./zip ./unzipped merged_output.csv"
)]
pub struct PipelineArgs {
    /// Folder containing the zip archives
    #[arg(value_name = "ZIP_FOLDER")]
    pub zip_folder: PathBuf,

    /// Folder the archives are extracted into (created if absent)
    #[arg(value_name = "OUTPUT_FOLDER")]
    pub output_folder: PathBuf,

    /// Merged CSV file to write
    #[arg(value_name = "MERGED_CSV")]
    pub merged_csv: PathBuf,
}

/// Split a CSV into one file per ShipVoyage value
#[derive(Parser, Debug, Clone)]
#[command(
    name = "split-voyages",
    version,
    about = "Split a CSV into one file per ShipVoyage value",
    after_help = "EXAMPLES:\n    \
        split-voyages merged_output.csv ./voyages"
)]
pub struct SplitArgs {
    /// CSV file to split
    #[arg(value_name = "INPUT_FILE")]
    pub input_file: PathBuf,

    /// Folder the per-voyage files are written into (created if absent)
    #[arg(value_name = "OUTPUT_FOLDER")]
    pub output_folder: PathBuf,
}

fn default_workers() -> usize {
    // One worker per available CPU, archives are decompressed on the worker
    num_cpus::get().clamp(1, MAX_WORKERS)
}

/// Archive extraction settings
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Folder scanned for archives
    pub input_dir: PathBuf,

    /// Shared folder every archive is extracted into
    pub output_dir: PathBuf,

    /// Size of the worker pool
    pub worker_count: usize,
}

impl ExtractConfig {
    /// Create an extraction config with one worker per CPU
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            worker_count: default_workers(),
        }
    }

    /// Override the pool size
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Check the pool size is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }
        Ok(())
    }
}

/// Chunked merge settings
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Folder scanned for delimited text files
    pub input_dir: PathBuf,

    /// Merged CSV path
    pub output_path: PathBuf,

    /// Maximum rows held in memory at once
    pub chunk_size: usize,

    /// Source field delimiter
    pub delimiter: u8,
}

impl MergeConfig {
    /// Create a merge config with the default chunk size and `|` delimiter
    pub fn new(input_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_path: output_path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            delimiter: SOURCE_DELIMITER,
        }
    }

    /// Override the chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Check the chunk size is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize {
                size: self.chunk_size,
            });
        }
        Ok(())
    }
}

/// Validated configuration for the extract + merge pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Extraction stage
    pub extract: ExtractConfig,

    /// Merge stage (reads the extraction output folder)
    pub merge: MergeConfig,
}

impl PipelineConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: PipelineArgs) -> Result<Self, ConfigError> {
        if !args.zip_folder.is_dir() {
            return Err(ConfigError::InputDirNotFound {
                path: args.zip_folder,
            });
        }

        let extract = ExtractConfig::new(args.zip_folder, args.output_folder.clone());
        let merge = MergeConfig::new(args.output_folder, args.merged_csv);

        extract.validate()?;
        merge.validate()?;

        Ok(Self { extract, merge })
    }
}

/// Key-based split settings
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// CSV file to split
    pub input_path: PathBuf,

    /// Folder the split files are written into
    pub output_dir: PathBuf,

    /// Column whose values partition the rows
    pub key_column: String,

    /// Output file name prefix
    pub file_prefix: String,
}

impl SplitConfig {
    /// Create a split config keyed on ShipVoyage
    pub fn new(input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            key_column: KEY_COLUMN.to_string(),
            file_prefix: SPLIT_FILE_PREFIX.to_string(),
        }
    }

    /// Create and validate configuration from CLI arguments
    ///
    /// The input file is not checked here; a missing file is reported when
    /// the table is loaded.
    pub fn from_args(args: SplitArgs) -> Result<Self, ConfigError> {
        let config = Self::new(args.input_file, args.output_folder);
        config.validate()?;
        Ok(config)
    }

    /// Check the key column is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_column.is_empty() {
            return Err(ConfigError::EmptyKeyColumn);
        }
        Ok(())
    }
}
