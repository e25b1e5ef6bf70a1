//! Segment parsing layer for the binary output file.
//!
//! This module bridges the raw byte cursor and the high-level
//! [`OutputReader`](crate::outfile::reader::OutputReader). Each submodule
//! parses one segment and returns a finished value.
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌──────────────────────┐
//! │  Prolog              │ ← header::parse()
//! ├──────────────────────┤ ← trailer: id-name offset
//! │  Name tables         │ ← catalog::parse()
//! │  Pollutant units     │
//! ├──────────────────────┤ ← trailer: property offset
//! │  Property tables     │ ← properties::parse()
//! ├──────────────────────┤
//! │  Variable codes      │ ← variables::parse()
//! ├──────────────────────┤
//! │  Reporting block     │ ← results::parse_reporting()
//! ├──────────────────────┤ ← trailer: results offset
//! │  Periods × stride    │ ← results::ResultsLayout
//! ├──────────────────────┤
//! │  Trailer (24 bytes)  │ ← closing::read()
//! └──────────────────────┘
//! ```

pub mod catalog;
pub mod closing;
pub mod header;
pub mod properties;
pub mod results;
pub mod variables;
