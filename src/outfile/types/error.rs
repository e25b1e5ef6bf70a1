//! Custom error types for the swmm-out-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// Every decode variant records the absolute byte offset at which the problem
/// was detected, so callers can report exactly where a file went wrong.
#[derive(Debug, Error)]
pub enum OutputError {
    /// An error originating from I/O operations (file loading in the harness).
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// A header or table field is outside its plausible range.
    #[error("Invalid format at byte {offset}: {reason}")]
    Format { offset: usize, reason: String },

    /// A read would run past the end of the buffer, or the results segment
    /// length disagrees with the declared period count.
    #[error("Truncated {context} at byte {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        context: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The sequential cursor disagrees with an offset declared in the trailer.
    #[error("Integrity check failed for {segment}: trailer says {declared}, reader at {offset}")]
    Integrity {
        segment: &'static str,
        offset: usize,
        declared: usize,
    },

    /// The trailer reports that the simulation run itself failed.
    #[error("Simulation reported error code {error_code} (trailer byte {offset})")]
    SimulationFailure { offset: usize, error_code: i32 },

    /// A parallel decode was cancelled between period chunks.
    #[error("Decode cancelled before period {period} (byte {offset})")]
    Cancelled { period: usize, offset: usize },
}

impl OutputError {
    /// Returns the byte offset attached to a decode error.
    ///
    /// `None` only for [`OutputError::Io`], which never originates inside the
    /// decoder.
    pub fn offset(&self) -> Option<usize> {
        match self {
            OutputError::Io(_) => None,
            OutputError::Format { offset, .. }
            | OutputError::Truncated { offset, .. }
            | OutputError::Integrity { offset, .. }
            | OutputError::SimulationFailure { offset, .. }
            | OutputError::Cancelled { offset, .. } => Some(*offset),
        }
    }

    pub(crate) fn format(offset: usize, reason: impl Into<String>) -> Self {
        OutputError::Format {
            offset,
            reason: reason.into(),
        }
    }
}

/// A convenience `Result` type alias using the crate's `OutputError` type.
pub type Result<T> = std::result::Result<T, OutputError>;
