//! # swmm-out-reader
//!
//! A reader for the binary results file written at the end of a hydraulic
//! simulation run. The whole file is expected in memory; the reader never
//! touches the filesystem.
//!
//! Two sibling dialects share one segment layout and are selected with a
//! [`FormatProfile`]: the drainage dialect (subcatchments, nodes, links,
//! pollutants) and the distribution dialect (nodes with tanks, links with
//! pumps and valves).
//!
//! ```no_run
//! use swmm_out_reader::{decode, DecodeOptions};
//!
//! let bytes = std::fs::read("model.out").unwrap();
//! let output = decode(&bytes, DecodeOptions::default()).unwrap();
//! for point in &output.results.subcatchments()["S1"] {
//!     println!("{} {:?}", point.timestamp(), point.value("rainfall"));
//! }
//! ```
pub mod outfile;

// Re-export the main types for convenience
pub use outfile::{
    decode, read_input_segments, DecodeOptions, DecodedOutput, FailurePolicy,
    InputSegmentWriter, OutputError, OutputReader, PeriodIterator, Result,
    codec::datetime::{from_serial_days, to_serial_days},
    types::{
        models::{
            ClosingRecord, EntityCatalog, EntityClass, EntityCounts, EntityNames, InputSegments,
            Prolog, PropertyRecord, PropertyTable, PropertyTables, ReportingInfo, VariableCode,
            VariableCodeTable, VariableCodes, VariableKey, VariableScope,
        },
        profile::{ConcentrationUnits, Dialect, FlowUnits, FormatProfile, PropertyField},
        results::{ClassSeries, Period, ResultSet, Series, TimeSeriesPoint},
    },
};
