//! Key-based splitter
//!
//! Loads a CSV fully into memory, partitions its rows by the value of one
//! column, and writes one CSV per distinct value.
//!
//! Output names are derived from the key with `:` and `/` replaced by `_`.
//! Two keys that sanitize to the same name write the same file; the group
//! whose key appears later in the input wins.

use crate::config::SplitConfig;
use crate::error::{SplitError, SplitResult};
use crate::table::{fit_to_width, line_of};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// A CSV held entirely in memory
#[derive(Debug, Clone)]
pub struct Table {
    /// Header row
    pub headers: StringRecord,

    /// Data rows, each padded to the header width
    pub rows: Vec<StringRecord>,
}

impl Table {
    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Rows sharing one key value, as indices into [`Table::rows`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoyageGroup {
    /// Key value as read from the input
    pub key: String,

    /// Row indices in input order
    pub rows: Vec<usize>,
}

/// One written split file
#[derive(Debug, Clone)]
pub struct SplitFile {
    /// Key value of the group
    pub key: String,

    /// File the group was written to
    pub path: PathBuf,

    /// Data rows written
    pub rows: u64,
}

/// Result of a completed split
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// Data rows in the input
    pub total_rows: u64,

    /// One entry per distinct key, in first-appearance order
    pub files: Vec<SplitFile>,

    /// Distinct output paths; lower than `files.len()` when sanitized
    /// names collide
    pub distinct_files: usize,

    /// Time taken for the split
    pub duration: Duration,
}

impl SplitReport {
    /// Number of distinct key values
    pub fn voyage_count(&self) -> usize {
        self.files.len()
    }
}

/// Replace path-unsafe characters in a key value
pub fn sanitize_key(key: &str) -> String {
    key.replace([':', '/'], "_")
}

/// Output file name for a key: `<prefix>_<sanitized key>.csv`
pub fn output_file_name(prefix: &str, key: &str) -> String {
    format!("{}_{}.csv", prefix, sanitize_key(key))
}

/// Load a comma-delimited CSV with a header row
pub fn load_table(path: &Path) -> SplitResult<Table> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SplitError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => SplitError::Io(e),
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let load_err = |source| SplitError::Load {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(load_err)?.clone();
    let width = headers.len();

    let mut rows = Vec::new();
    for result in reader.records() {
        let mut record = result.map_err(load_err)?;
        if !fit_to_width(&mut record, width) {
            return Err(SplitError::RowTooWide {
                path: path.to_path_buf(),
                line: line_of(&record),
                expected: width,
                found: record.len(),
            });
        }
        rows.push(record);
    }

    Ok(Table { headers, rows })
}

/// Partition rows by the value of `column`
///
/// Groups are returned in order of first appearance. Empty values form
/// their own group.
pub fn group_by_column(table: &Table, column: usize) -> Vec<VoyageGroup> {
    let mut groups: Vec<VoyageGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (row_idx, row) in table.rows.iter().enumerate() {
        let key = row.get(column).unwrap_or("");
        match index.entry(key) {
            Entry::Occupied(slot) => groups[*slot.get()].rows.push(row_idx),
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(VoyageGroup {
                    key: key.to_string(),
                    rows: vec![row_idx],
                });
            }
        }
    }

    groups
}

/// Write the rows of one group, with the table header, to `path`
pub fn write_group(table: &Table, group: &VoyageGroup, path: &Path) -> SplitResult<()> {
    let write_err = |source| SplitError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(write_err)?;

    writer.write_record(&table.headers).map_err(write_err)?;
    for &row in &group.rows {
        writer.write_record(&table.rows[row]).map_err(write_err)?;
    }
    writer.flush()?;

    Ok(())
}

/// Split `config.input_path` into one file per key value under
/// `config.output_dir`
pub fn split_by_key(config: &SplitConfig) -> SplitResult<SplitReport> {
    let start_time = Instant::now();

    let table = load_table(&config.input_path)?;
    let column = table
        .column_index(&config.key_column)
        .ok_or_else(|| SplitError::MissingColumn {
            column: config.key_column.clone(),
            path: config.input_path.clone(),
        })?;

    fs::create_dir_all(&config.output_dir)?;

    let groups = group_by_column(&table, column);
    let mut files = Vec::with_capacity(groups.len());
    let mut paths = HashSet::new();

    for group in &groups {
        let path = config
            .output_dir
            .join(output_file_name(&config.file_prefix, &group.key));

        write_group(&table, group, &path)?;
        info!(file = %path.display(), rows = group.rows.len(), "Saved");

        paths.insert(path.clone());
        files.push(SplitFile {
            key: group.key.clone(),
            path,
            rows: group.rows.len() as u64,
        });
    }

    Ok(SplitReport {
        total_rows: table.rows.len() as u64,
        distinct_files: paths.len(),
        files,
        duration: start_time.elapsed(),
    })
}
