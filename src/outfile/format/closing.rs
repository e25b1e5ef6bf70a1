//! Trailer (closing record) parsing.
//!
//! The last 24 bytes of the file:
//! ```text
//! [4 bytes] id-name segment offset
//! [4 bytes] property segment offset
//! [4 bytes] results segment offset
//! [4 bytes] reporting period count
//! [4 bytes] error code
//! [4 bytes] identification number (drainage) / reserved (distribution)
//! ```
//! Reading it is independent of the forward pass, so it can run first.

use log::trace;

use crate::outfile::codec::cursor::ByteCursor;
use crate::outfile::types::{
    error::{OutputError, Result},
    models::ClosingRecord,
    profile::FormatProfile,
};

/// Size of the trailer in bytes.
pub const CLOSING_RECORD_LEN: usize = 24;

/// Byte offset of the error-code slot inside the trailer.
pub const ERROR_CODE_SLOT: usize = 16;

pub fn read(bytes: &[u8], profile: &FormatProfile) -> Result<ClosingRecord> {
    let start = bytes
        .len()
        .checked_sub(CLOSING_RECORD_LEN)
        .ok_or(OutputError::Truncated {
            context: "closing record",
            offset: 0,
            needed: CLOSING_RECORD_LEN,
            available: bytes.len(),
        })?;

    let mut cursor = ByteCursor::at(bytes, start, "closing record")?;
    let record = ClosingRecord {
        id_name_offset: cursor.read_i32("closing record")?,
        property_offset: cursor.read_i32("closing record")?,
        results_offset: cursor.read_i32("closing record")?,
        period_count: cursor.read_i32("closing record")?,
        error_code: cursor.read_i32("closing record")?,
        closing_magic: {
            let last = cursor.read_i32("closing record")?;
            profile.closing_magic.then_some(last)
        },
    };
    trace!("Closing record at byte {}: {:?}", start, record);
    Ok(record)
}
