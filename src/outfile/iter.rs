//! Sequential access to reporting periods.
//!
//! [`PeriodIterator`] decodes one period per step, so memory stays bounded by
//! a single period no matter how long the run. Skipping with `nth` jumps
//! straight to the target offset instead of decoding the periods in between.
//!
//! # Example
//! ```no_run
//! # use swmm_out_reader::{DecodeOptions, OutputReader};
//! # let bytes = std::fs::read("model.out").unwrap();
//! let reader = OutputReader::from_bytes(&bytes, DecodeOptions::default()).unwrap();
//! for period in reader.iter_periods() {
//!     let period = period.unwrap();
//!     println!("{}: {:?}", period.timestamp(), period.system_values());
//! }
//! ```

use std::iter::FusedIterator;

use chrono::NaiveDateTime;
use log::warn;

use super::format::results::{self, ResultsLayout};
use super::types::error::{OutputError, Result};
use super::types::results::Period;

/// Iterator over decoded periods.
///
/// Created by [`OutputReader::iter_periods()`](crate::OutputReader::iter_periods).
/// Stops after the first error.
pub struct PeriodIterator<'r, 'a> {
    layout: &'r ResultsLayout<'a>,
    next: usize,
    end: usize,
    last: Option<NaiveDateTime>,
    step_millis: Option<i64>,
}

impl<'r, 'a> PeriodIterator<'r, 'a> {
    pub(super) fn new(layout: &'r ResultsLayout<'a>, step_millis: Option<i64>) -> Self {
        Self {
            layout,
            next: 0,
            end: layout.period_count(),
            last: None,
            step_millis,
        }
    }

    fn fail(&mut self, err: OutputError) -> Option<Result<Period>> {
        self.next = self.end;
        Some(Err(err))
    }
}

impl<'r, 'a> Iterator for PeriodIterator<'r, 'a> {
    type Item = Result<Period>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let period = match self.layout.decode_period(index) {
            Ok(period) => period,
            Err(e) => return self.fail(e),
        };

        if let Some(prev) = self.last.replace(period.timestamp()) {
            if let Err(e) = results::check_step(prev, &period) {
                return self.fail(e);
            }
            let elapsed = (period.timestamp() - prev).num_milliseconds();
            if let Some(step) = self.step_millis
                && elapsed != step
            {
                warn!(
                    "Period {} arrives {} ms after the previous one, reporting step is {} ms",
                    index, elapsed, step
                );
            }
        }

        Some(Ok(period))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.end.saturating_sub(self.next);
        (left, Some(left))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        // The skipped periods are never read, so there is nothing to compare
        // the next timestamp against.
        if n > 0 {
            self.next = self.next.saturating_add(n).min(self.end);
            self.last = None;
        }
        self.next()
    }
}

impl ExactSizeIterator for PeriodIterator<'_, '_> {}

impl FusedIterator for PeriodIterator<'_, '_> {}
