//! Chunked reader for pipe-delimited source files
//!
//! Reads one source file in batches of at most `chunk_size` rows so the
//! merge never holds more than one batch in memory.

use crate::error::{MergeError, MergeResult};
use crate::table::{fit_to_width, line_of};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// A bounded batch of rows read from one source file
#[derive(Debug, Default, Clone)]
pub struct RecordBatch {
    rows: Vec<StringRecord>,
}

impl RecordBatch {
    /// Number of rows in the batch
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the batch has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in source order
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }
}

/// Streams a delimited file as a sequence of [`RecordBatch`]es
///
/// The first call always yields a batch, possibly empty, so a header-only
/// file still contributes its header to the merged output.
pub struct ChunkedReader<R> {
    /// Source path, for error messages
    path: PathBuf,

    /// Underlying CSV reader
    reader: Reader<R>,

    /// Header row of this file
    headers: StringRecord,

    /// Maximum rows per batch
    chunk_size: usize,

    /// Whether a batch has been handed out yet
    emitted: bool,

    /// End of input or error reached
    exhausted: bool,
}

impl ChunkedReader<BufReader<File>> {
    /// Open a source file for chunked reading
    pub fn open(path: &Path, delimiter: u8, chunk_size: usize) -> MergeResult<Self> {
        let file = File::open(path).map_err(|source| MergeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file), delimiter, chunk_size)
    }
}

impl<R: Read> ChunkedReader<R> {
    /// Wrap any reader; `path` is only used to label errors
    pub fn from_reader(
        path: &Path,
        rdr: R,
        delimiter: u8,
        chunk_size: usize,
    ) -> MergeResult<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(rdr);

        let headers = reader
            .headers()
            .map_err(|source| MergeError::Parse {
                path: path.to_path_buf(),
                source,
            })?
            .clone();

        if headers.is_empty() {
            return Err(MergeError::EmptySource {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
            chunk_size: chunk_size.max(1),
            emitted: false,
            exhausted: false,
        })
    }

    /// Header row of this file
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Read the next batch, `None` once the file is consumed
    pub fn next_batch(&mut self) -> MergeResult<Option<RecordBatch>> {
        if self.exhausted {
            return Ok(None);
        }

        let width = self.headers.len();
        let mut rows = Vec::with_capacity(self.chunk_size.min(4096));
        let mut record = StringRecord::new();

        while rows.len() < self.chunk_size {
            let more = self.reader.read_record(&mut record).map_err(|source| {
                self.exhausted = true;
                MergeError::Parse {
                    path: self.path.clone(),
                    source,
                }
            })?;
            if !more {
                self.exhausted = true;
                break;
            }

            if !fit_to_width(&mut record, width) {
                self.exhausted = true;
                return Err(MergeError::RowTooWide {
                    path: self.path.clone(),
                    line: line_of(&record),
                    expected: width,
                    found: record.len(),
                });
            }
            rows.push(record.clone());
        }

        if rows.is_empty() && self.emitted {
            return Ok(None);
        }
        self.emitted = true;

        Ok(Some(RecordBatch { rows }))
    }
}

impl<R: Read> Iterator for ChunkedReader<R> {
    type Item = MergeResult<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
