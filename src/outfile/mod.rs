//! Core reader module for binary simulation output files.
//!
//! # Module Organization
//!
//! - [`codec`]: Bounds-checked reads and serial-day timestamps
//! - [`format`]: One parser per file segment
//! - [`types`]: Data structures, error types and dialect profiles
//! - [`reader`]: [`OutputReader`], the validated forward pass
//! - [`iter`]: Lazy period iteration
//! - [`encode`]: Byte-exact writer for the input segments

pub mod codec;
pub mod encode;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
mod utils;

pub use encode::InputSegmentWriter;
pub use iter::PeriodIterator;
pub use reader::{
    decode, read_input_segments, DecodeOptions, DecodedOutput, FailurePolicy, OutputReader,
};
pub use types::error::{OutputError, Result};
