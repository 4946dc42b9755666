//! Directory listing by file extension

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// List regular files in `dir` whose name ends in `.{extension}`,
/// compared case-insensitively
///
/// Entries are returned in directory listing order, which is not stable
/// across platforms or runs.
pub fn list_with_extension(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension.to_ascii_lowercase());
    let mut found = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let matches = name
            .to_str()
            .map(|n| n.to_ascii_lowercase().ends_with(&suffix))
            .unwrap_or(false);

        if matches {
            found.push(entry.path());
        }
    }

    Ok(found)
}
