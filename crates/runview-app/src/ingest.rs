//! Log file reading for ingestion
//!
//! Log files arrive in a single-byte legacy encoding (ISO-8859-2), not
//! UTF-8; decode before line splitting.

use std::path::PathBuf;

use encoding_rs::ISO_8859_2;

use runview_core::prelude::*;

/// Read and decode one log file
pub fn read_log_file(path: &std::path::Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let (text, _, _) = ISO_8859_2.decode(&bytes);
    Ok(text.into_owned())
}

/// Order log files by modification time, oldest first
///
/// This is the ingestion order: rotated logs are usually named
/// arbitrarily but their mtimes follow the rotation.
pub fn sort_by_mtime(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut keyed = Vec::with_capacity(paths.len());
    for path in paths {
        let mtime = std::fs::metadata(&path)?.modified()?;
        keyed.push((mtime, path));
    }
    keyed.sort_by_key(|(mtime, _)| *mtime);
    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}
