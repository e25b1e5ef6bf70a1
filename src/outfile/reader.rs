use log::{info, warn};

use super::codec::cursor::ByteCursor;
use super::format::closing::{CLOSING_RECORD_LEN, ERROR_CODE_SLOT};
use super::format::{self, results::ResultsLayout};
use super::iter::PeriodIterator;
use super::types::error::{OutputError, Result};
use super::types::models::*;
use super::types::profile::FormatProfile;
use super::types::results::{Period, ResultSet};
use super::utils;

/// What to do when the trailer reports a failed simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Raise [`OutputError::SimulationFailure`].
    #[default]
    Abort,
    /// Log a warning and decode the whole periods that were written.
    DecodeAvailable,
}

/// Options for [`OutputReader::from_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub profile: FormatProfile,
    pub on_simulation_failure: FailurePolicy,
    /// Compare each reporting interval with the declared step and log
    /// mismatches.
    pub check_interval: bool,
    /// Periods per task in the parallel decode.
    pub parallel_chunk: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            profile: FormatProfile::DRAINAGE,
            on_simulation_failure: FailurePolicy::Abort,
            check_interval: true,
            parallel_chunk: 64,
        }
    }
}

impl DecodeOptions {
    pub fn with_profile(mut self, profile: FormatProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_simulation_failure = policy;
        self
    }

    pub fn with_interval_check(mut self, enabled: bool) -> Self {
        self.check_interval = enabled;
        self
    }

    pub fn with_parallel_chunk(mut self, periods: usize) -> Self {
        self.parallel_chunk = periods;
        self
    }
}

/// Reads the prolog, name tables and property tables, without the trailer
/// cross-checks.
pub fn read_input_segments(bytes: &[u8], profile: &FormatProfile) -> Result<InputSegments> {
    let mut cursor = ByteCursor::new(bytes);
    let prolog = format::header::parse(&mut cursor, profile)?;
    let catalog = format::catalog::parse(&mut cursor, &prolog, profile)?;
    let properties = format::properties::parse(&mut cursor, &prolog, profile)?;
    Ok(InputSegments {
        prolog,
        catalog,
        properties,
    })
}

/// The reader for one in-memory output file.
///
/// Construction runs the forward pass over every segment up to the results
/// and validates each segment boundary against the trailer. Results are
/// decoded on demand, either one period at a time or all at once.
#[derive(Debug, Clone)]
pub struct OutputReader<'a> {
    options: DecodeOptions,
    prolog: Prolog,
    catalog: EntityCatalog,
    properties: PropertyTables,
    variables: VariableCodeTable,
    reporting: ReportingInfo,
    closing: ClosingRecord,
    layout: ResultsLayout<'a>,
}

impl<'a> OutputReader<'a> {
    /// Parses every segment before the results.
    ///
    /// # Errors
    /// Returns an error if:
    /// - A count is negative or cannot fit in the buffer (`Format`)
    /// - A read runs past the end, or the results segment length disagrees
    ///   with the declared period count (`Truncated`)
    /// - A segment does not start where the trailer says it does (`Integrity`)
    /// - The run failed and the policy is [`FailurePolicy::Abort`]
    ///   (`SimulationFailure`)
    pub fn from_bytes(bytes: &'a [u8], options: DecodeOptions) -> Result<Self> {
        let profile = &options.profile;
        info!("Reading {} output file ({} bytes)", profile.dialect, bytes.len());

        let closing = format::closing::read(bytes, profile)?;
        let trailer_start = bytes.len() - CLOSING_RECORD_LEN;

        // Segments before the results never extend into the trailer.
        let mut cursor = ByteCursor::new(&bytes[..trailer_start]);
        let prolog = format::header::parse(&mut cursor, profile)?;
        if let Some(magic) = closing.closing_magic
            && magic != prolog.format_id
        {
            return Err(OutputError::format(
                trailer_start + 20,
                format!(
                    "closing identification number {} does not match prolog {}",
                    magic, prolog.format_id
                ),
            ));
        }

        check_boundary(&cursor, closing.id_name_offset, trailer_start, "name tables")?;
        let catalog = format::catalog::parse(&mut cursor, &prolog, profile)?;

        check_boundary(&cursor, closing.property_offset, trailer_start + 4, "property tables")?;
        let properties = format::properties::parse(&mut cursor, &prolog, profile)?;

        let variables = format::variables::parse(&mut cursor, profile)?;
        let reporting = format::results::parse_reporting(&mut cursor)?;

        check_boundary(&cursor, closing.results_offset, trailer_start + 8, "results segment")?;

        let failed = closing.error_code != 0;
        if failed {
            let offset = trailer_start + ERROR_CODE_SLOT;
            match options.on_simulation_failure {
                FailurePolicy::Abort => {
                    return Err(OutputError::SimulationFailure {
                        offset,
                        error_code: closing.error_code,
                    });
                }
                FailurePolicy::DecodeAvailable => warn!(
                    "Simulation reported error code {}; decoding the periods that are present",
                    closing.error_code
                ),
            }
        }

        let shape = format::results::period_shape(&prolog, &variables, profile);
        let layout = ResultsLayout::new(bytes, cursor.position(), &closing, shape, failed)?;

        info!(
            "Output file opened: {} periods from {}",
            layout.period_count(),
            reporting.start
        );

        Ok(Self {
            options,
            prolog,
            catalog,
            properties,
            variables,
            reporting,
            closing,
            layout,
        })
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn prolog(&self) -> &Prolog {
        &self.prolog
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn properties(&self) -> &PropertyTables {
        &self.properties
    }

    pub fn variables(&self) -> &VariableCodeTable {
        &self.variables
    }

    pub fn reporting(&self) -> &ReportingInfo {
        &self.reporting
    }

    pub fn closing(&self) -> &ClosingRecord {
        &self.closing
    }

    pub fn results_layout(&self) -> &ResultsLayout<'a> {
        &self.layout
    }

    /// Number of periods that can be decoded. Lower than the trailer's count
    /// only for a failed run decoded under [`FailurePolicy::DecodeAvailable`].
    pub fn num_periods(&self) -> usize {
        self.layout.period_count()
    }

    /// Byte length of one reporting period.
    pub fn period_stride(&self) -> usize {
        self.layout.stride()
    }

    /// Name of the pollutant behind an unresolved variable key, if any.
    pub fn pollutant_name(&self, scope: VariableScope, key: &VariableKey) -> Option<&str> {
        let table = self.options.profile.variable_table(scope);
        self.catalog.pollutant_for(&table, key)
    }

    /// Decodes a single period by index (random access).
    pub fn read_period(&self, index: usize) -> Result<Period> {
        self.layout.decode_period(index)
    }

    /// Lazily decodes periods in order.
    pub fn iter_periods(&self) -> PeriodIterator<'_, 'a> {
        PeriodIterator::new(&self.layout, self.expected_step())
    }

    /// Decodes every period on the calling thread.
    pub fn decode(&self) -> Result<ResultSet> {
        info!("Decoding {} periods", self.layout.period_count());
        let periods = self.layout.decode_all()?;
        self.finish(periods)
    }

    /// Decodes periods in parallel chunks, polling `should_cancel` before
    /// each chunk.
    pub fn decode_parallel_with_cancel<F>(&self, should_cancel: F) -> Result<ResultSet>
    where
        F: Fn() -> bool + Sync,
    {
        info!(
            "Decoding {} periods in chunks of {}",
            self.layout.period_count(),
            self.options.parallel_chunk
        );
        let periods = self
            .layout
            .decode_parallel(self.options.parallel_chunk, should_cancel)?;
        self.finish(periods)
    }

    pub fn decode_parallel(&self) -> Result<ResultSet> {
        self.decode_parallel_with_cancel(|| false)
    }

    fn expected_step(&self) -> Option<i64> {
        self.options
            .check_interval
            .then(|| self.reporting.step_millis())
    }

    fn finish(&self, periods: Vec<Period>) -> Result<ResultSet> {
        format::results::check_timeline(&periods, self.expected_step())?;
        Ok(format::results::assemble(
            &periods,
            self.layout.shape(),
            &self.catalog,
        ))
    }
}

/// Every segment of a decoded file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedOutput {
    pub prolog: Prolog,
    pub catalog: EntityCatalog,
    pub properties: PropertyTables,
    pub variables: VariableCodeTable,
    pub reporting: ReportingInfo,
    pub closing: ClosingRecord,
    pub results: ResultSet,
}

/// Decodes a whole file in one call.
pub fn decode(bytes: &[u8], options: DecodeOptions) -> Result<DecodedOutput> {
    let reader = OutputReader::from_bytes(bytes, options)?;
    let results = reader.decode()?;
    Ok(DecodedOutput {
        prolog: reader.prolog,
        catalog: reader.catalog,
        properties: reader.properties,
        variables: reader.variables,
        reporting: reader.reporting,
        closing: reader.closing,
        results,
    })
}

/// Fails unless the cursor sits exactly where the trailer places a segment.
fn check_boundary(
    cursor: &ByteCursor<'_>,
    declared: i32,
    slot_offset: usize,
    segment: &'static str,
) -> Result<()> {
    let declared = utils::to_count(declared, slot_offset, "segment offset")?;
    if declared != cursor.position() {
        return Err(OutputError::Integrity {
            segment,
            offset: cursor.position(),
            declared,
        });
    }
    Ok(())
}
