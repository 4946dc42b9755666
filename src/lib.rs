//! voyage-batch - Batch tools for tabular shipping data
//!
//! Three independent one-pass jobs that hand off through the filesystem:
//!
//! - **Archive extraction**: every `.zip` in a folder is extracted into a
//!   shared output folder by a fixed-size worker pool, one task per
//!   archive. A corrupt archive is reported and skipped.
//!
//! - **Chunked merge**: every pipe-delimited `.txt` file in a folder is
//!   streamed in bounded row batches into a single CSV with one header.
//!
//! - **Key split**: a CSV is loaded into memory and written back out as one
//!   file per distinct `ShipVoyage` value.
//!
//! # Pipeline
//!
//! ```text
//!   zip folder ──► [extract pool] ──► output folder ──► [chunked merge] ──► merged.csv
//!                                                                            │
//!                                                       [key split] ◄────────┘
//!                                                            │
//!                                                            ▼
//!                                              ShipVoyage_<key>.csv, ...
//! ```
//!
//! # Example
//!
//! ```bash
//! unzip-to-csv ./zip ./unzipped merged_output.csv
//! split-voyages merged_output.csv ./voyages
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod merge;
pub mod scan;
pub mod split;
pub mod summary;
pub mod table;

pub use config::{ExtractConfig, MergeConfig, PipelineArgs, PipelineConfig, SplitArgs, SplitConfig};
pub use error::{BatchError, Result};
pub use extract::{ExtractCoordinator, ExtractResult};
pub use merge::{merge_directory, MergeReport};
pub use split::{split_by_key, SplitReport};
