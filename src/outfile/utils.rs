//! Shared helpers for validating counts and offsets read from the file.

use crate::outfile::types::error::{OutputError, Result};

/// Convert a stored count or offset to `usize`, rejecting negative values.
pub fn to_count(value: i32, offset: usize, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| OutputError::format(offset, format!("negative {}: {}", what, value)))
}

/// Reject a count whose smallest possible encoding would not fit in the bytes
/// that remain.
pub fn check_plausible(
    count: usize,
    min_record_size: usize,
    remaining: usize,
    offset: usize,
    what: &str,
) -> Result<()> {
    match count.checked_mul(min_record_size) {
        Some(needed) if needed <= remaining => Ok(()),
        _ => Err(OutputError::format(
            offset,
            format!(
                "{} {} needs at least {} bytes each, only {} bytes remain",
                count, what, min_record_size, remaining
            ),
        )),
    }
}
