use std::path::Path;
use thiserror::Error;

/// Errors from the per-camera capture database.
#[derive(Debug, Error)]
pub enum PhotoDbError {
    #[error("unknown record index")]
    UnknownIndex,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Width of one record, including its terminating newline.
///
/// The capture database is a sorted list of photo paths, one per line, all
/// the same length, so the first line fixes the width for the whole file.
fn record_width(data: &[u8]) -> Option<usize> {
    let first = data.split(|b| *b == b'\n').next()?;
    if first.is_empty() {
        None
    } else {
        Some(first.len() + 1)
    }
}

/// Number of complete records in the database.
pub fn record_count(data: &[u8]) -> usize {
    match record_width(data) {
        Some(width) => data.len() / width,
        None => 0,
    }
}

/// Record at `index`, which may be negative or out of range and wraps
/// modulo the record count.
pub fn record_at(data: &[u8], index: i64) -> Option<&str> {
    let width = record_width(data)?;
    let total = (data.len() / width) as i64;
    if total == 0 {
        return None;
    }
    let slot = index.rem_euclid(total) as usize;
    let record = &data[slot * width..(slot + 1) * width - 1];
    std::str::from_utf8(record).ok().map(str::trim_end)
}

/// Look up a photo path by index in a camera's capture database file.
pub async fn lookup(db_path: &Path, index: i64) -> Result<String, PhotoDbError> {
    let data = match tokio::fs::read(db_path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PhotoDbError::UnknownIndex);
        }
        Err(e) => return Err(e.into()),
    };
    record_at(&data, index)
        .map(str::to_string)
        .ok_or(PhotoDbError::UnknownIndex)
}
