//! Append-only writer for the merged CSV
//!
//! The first batch ever written creates (truncates) the output and writes
//! the header. Every later batch is appended without a header. The header
//! of the first batch fixes the output schema; later batches are not
//! checked against it.

use crate::error::{MergeError, MergeResult};
use crate::merge::reader::RecordBatch;
use csv::{StringRecord, Writer, WriterBuilder};
use std::fs::File;
use std::path::PathBuf;

/// Totals reported when the merged output is closed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterTotals {
    /// Data rows written (header excluded)
    pub rows_written: u64,

    /// Batches written
    pub batches_written: u64,

    /// Largest batch seen, in rows
    pub peak_batch_rows: usize,

    /// Whether the output file was created
    pub output_created: bool,
}

/// Writer for the single merged output table
pub struct MergedTableWriter {
    /// Output CSV path
    path: PathBuf,

    /// Open output, created lazily by the first batch
    writer: Option<Writer<File>>,

    /// Header written with the first batch
    header: Option<StringRecord>,

    /// Running totals
    totals: WriterTotals,
}

impl MergedTableWriter {
    /// Create a writer; nothing touches disk until the first batch
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            header: None,
            totals: WriterTotals::default(),
        }
    }

    /// Header of the merged table, once the first batch is written
    pub fn header(&self) -> Option<&StringRecord> {
        self.header.as_ref()
    }

    /// Write one batch
    ///
    /// `header` is only used for the very first batch.
    pub fn write_batch(&mut self, header: &StringRecord, batch: &RecordBatch) -> MergeResult<()> {
        let path = &self.path;
        let writer = match &mut self.writer {
            Some(writer) => writer,
            slot => {
                // Later sources may differ in width; rows go out as read
                let mut writer = WriterBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_path(path)
                    .map_err(|source| MergeError::Write {
                        path: path.clone(),
                        source,
                    })?;
                writer
                    .write_record(header)
                    .map_err(|source| MergeError::Write {
                        path: path.clone(),
                        source,
                    })?;
                self.header = Some(header.clone());
                self.totals.output_created = true;
                slot.insert(writer)
            }
        };

        for row in batch.rows() {
            writer.write_record(row).map_err(|source| MergeError::Write {
                path: path.clone(),
                source,
            })?;
        }
        writer.flush()?;

        self.totals.rows_written += batch.len() as u64;
        self.totals.batches_written += 1;
        self.totals.peak_batch_rows = self.totals.peak_batch_rows.max(batch.len());

        Ok(())
    }

    /// Flush and close the output
    pub fn finish(mut self) -> MergeResult<WriterTotals> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(self.totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::reader::ChunkedReader;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn batches(data: &str, chunk: usize) -> (StringRecord, Vec<RecordBatch>) {
        let reader =
            ChunkedReader::from_reader(Path::new("t.txt"), data.as_bytes(), b'|', chunk).unwrap();
        let header = reader.headers().clone();
        let batches = reader.map(|b| b.unwrap()).collect();
        (header, batches)
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("merged.csv");
        let mut writer = MergedTableWriter::new(&out);

        let (header, first) = batches("a|b\n1|2\n3|4\n", 1);
        for batch in &first {
            writer.write_batch(&header, batch).unwrap();
        }
        let (header, second) = batches("a|b\n5|6\n", 1);
        for batch in &second {
            writer.write_batch(&header, batch).unwrap();
        }

        let totals = writer.finish().unwrap();
        assert_eq!(totals.rows_written, 3);
        assert_eq!(totals.batches_written, 3);
        assert_eq!(totals.peak_batch_rows, 1);
        assert!(totals.output_created);
        assert_eq!(fs::read_to_string(&out).unwrap(), "a,b\n1,2\n3,4\n5,6\n");
    }

    #[test]
    fn test_first_batch_truncates_existing_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("merged.csv");
        fs::write(&out, "stale,data\nx,y\n").unwrap();

        let mut writer = MergedTableWriter::new(&out);
        let (header, b) = batches("k|v\n1|two words\n", 10);
        writer.write_batch(&header, &b[0]).unwrap();
        writer.finish().unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "k,v\n1,two words\n");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("merged.csv");
        let mut writer = MergedTableWriter::new(&out);
        let (header, b) = batches("port|note\nRotterdam|late, rerouted\n", 10);
        writer.write_batch(&header, &b[0]).unwrap();
        writer.finish().unwrap();

        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "port,note\nRotterdam,\"late, rerouted\"\n"
        );
    }

    #[test]
    fn test_no_batches_creates_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("merged.csv");
        let totals = MergedTableWriter::new(&out).finish().unwrap();
        assert!(!totals.output_created);
        assert!(!out.exists());
    }
}
