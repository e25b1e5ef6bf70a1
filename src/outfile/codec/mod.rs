//! Primitive decoding layer.
//!
//! # Submodules
//!
//! - [`cursor`][]: Bounds-checked little-endian reads over the input buffer
//! - [`datetime`][]: Serial day counts to calendar instants and back

pub mod cursor;
pub mod datetime;
