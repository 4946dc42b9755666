//! Row shape helpers shared by the merge and split stages

use csv::StringRecord;

/// Bring a parsed row to the header width
///
/// Short rows are padded with empty fields. Returns `false` when the row
/// has more fields than the header; those rows are malformed.
pub fn fit_to_width(record: &mut StringRecord, width: usize) -> bool {
    if record.len() > width {
        return false;
    }
    while record.len() < width {
        record.push_field("");
    }
    true
}

/// Line number of a parsed row, for error messages
pub fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
