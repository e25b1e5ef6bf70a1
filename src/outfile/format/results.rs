//! Reporting block and results segment.
//!
//! # Reporting block
//! ```text
//! [8 bytes] report start, serial days
//! [4 bytes] report step, seconds
//! ```
//!
//! # Results segment
//! `period_count` periods of a constant stride, each laid out as:
//! ```text
//! [8 bytes]                  timestamp, serial days
//! [4 bytes × nSub × vSub]    subcatchment values, entity-major
//! [4 bytes × nNode × vNode]  node values
//! [4 bytes × nLink × vLink]  link values
//! [4 bytes × vSys]           system values
//! ```
//! Because the stride is known before the first period is read, any period
//! can be decoded on its own, and disjoint period ranges can be decoded on
//! separate threads.

use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{debug, info, trace, warn};
use rayon::prelude::*;

use crate::outfile::codec::cursor::ByteCursor;
use crate::outfile::codec::datetime;
use crate::outfile::format::closing::CLOSING_RECORD_LEN;
use crate::outfile::types::{
    error::{OutputError, Result},
    models::{
        ClosingRecord, EntityCatalog, EntityClass, EntityNames, Prolog, ReportingInfo,
        VariableCodeTable, VariableKey, VariableScope,
    },
    profile::FormatProfile,
    results::{ClassSeries, ClassSpan, Period, PeriodShape, ResultSet, Series, TimeSeriesPoint},
};
use crate::outfile::utils;

pub fn parse_reporting(cursor: &mut ByteCursor<'_>) -> Result<ReportingInfo> {
    let offset = cursor.position();
    let start_days = cursor.read_f64("reporting block")?;
    let step_offset = cursor.position();
    let step_seconds = cursor.read_i32("reporting block")?;

    let start = datetime::from_serial_days(start_days).ok_or_else(|| {
        OutputError::format(
            offset,
            format!("report start {} is not a representable instant", start_days),
        )
    })?;
    if step_seconds < 0 {
        return Err(OutputError::format(
            step_offset,
            format!("negative report step: {}", step_seconds),
        ));
    }

    debug!("Reporting from {} every {} s", start, step_seconds);
    Ok(ReportingInfo {
        start_days,
        start,
        step_seconds,
    })
}

/// Lays out one period's value block from the entity counts and the
/// variable lists, in the profile's result-class order.
pub fn period_shape(
    prolog: &Prolog,
    variables: &VariableCodeTable,
    profile: &FormatProfile,
) -> PeriodShape {
    let keys_for = |scope: VariableScope| -> Arc<[VariableKey]> {
        variables
            .get(scope)
            .map(|list| list.keys().clone())
            .unwrap_or_else(|| Arc::from(Vec::new()))
    };

    let mut spans = Vec::with_capacity(profile.result_classes.len());
    let mut start = 0;
    for class in profile.result_classes {
        let keys = class.scope().map_or_else(|| Arc::from(Vec::new()), keys_for);
        let span = ClassSpan {
            class: *class,
            entities: prolog.counts.count(*class),
            keys,
            start,
        };
        start += span.len();
        spans.push(span);
    }

    let system_keys = keys_for(VariableScope::System);
    let values_per_period = start + system_keys.len();
    PeriodShape {
        spans,
        system_keys,
        system_start: start,
        values_per_period,
    }
}

/// Offset arithmetic over a validated results segment.
#[derive(Debug, Clone)]
pub struct ResultsLayout<'a> {
    bytes: &'a [u8],
    start: usize,
    period_count: usize,
    declared_periods: usize,
    shape: Arc<PeriodShape>,
}

impl<'a> ResultsLayout<'a> {
    /// Checks the segment length against the declared period count.
    ///
    /// The bytes between `start` and the trailer must hold exactly
    /// `period_count` periods. With `accept_partial` set, a mismatch is logged
    /// and only the whole periods present (at most the declared count) are
    /// exposed.
    pub fn new(
        bytes: &'a [u8],
        start: usize,
        closing: &ClosingRecord,
        shape: PeriodShape,
        accept_partial: bool,
    ) -> Result<Self> {
        let trailer_start =
            bytes
                .len()
                .checked_sub(CLOSING_RECORD_LEN)
                .ok_or(OutputError::Truncated {
                    context: "closing record",
                    offset: 0,
                    needed: CLOSING_RECORD_LEN,
                    available: bytes.len(),
                })?;
        if start > trailer_start {
            return Err(OutputError::Truncated {
                context: "results segment",
                offset: trailer_start,
                needed: start - trailer_start,
                available: 0,
            });
        }

        let count_offset = trailer_start + 12;
        let declared_periods = utils::to_count(closing.period_count, count_offset, "period count")?;
        let stride = shape.stride_bytes();
        let available = trailer_start - start;
        let whole = available / stride;

        let needed = declared_periods.checked_mul(stride).ok_or_else(|| {
            OutputError::format(
                count_offset,
                format!(
                    "{} periods of {} bytes exceed the addressable size",
                    declared_periods, stride
                ),
            )
        })?;

        let period_count = if needed == available {
            declared_periods
        } else if accept_partial {
            let usable = declared_periods.min(whole);
            warn!(
                "Results segment holds {} bytes, {} periods declared need {}; decoding {} periods",
                available, declared_periods, needed, usable
            );
            usable
        } else {
            return Err(OutputError::Truncated {
                context: "results segment",
                offset: start + stride * declared_periods.min(whole),
                needed,
                available,
            });
        };

        info!(
            "Results segment at byte {}: {} periods, stride {} bytes",
            start, period_count, stride
        );

        Ok(Self {
            bytes,
            start,
            period_count,
            declared_periods,
            shape: Arc::new(shape),
        })
    }

    /// Byte offset of the first period.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of periods that can be decoded.
    pub fn period_count(&self) -> usize {
        self.period_count
    }

    /// Period count stored in the trailer.
    pub fn declared_periods(&self) -> usize {
        self.declared_periods
    }

    pub fn stride(&self) -> usize {
        self.shape.stride_bytes()
    }

    pub fn shape(&self) -> &Arc<PeriodShape> {
        &self.shape
    }

    pub fn period_offset(&self, index: usize) -> usize {
        self.start + index * self.stride()
    }

    /// Decodes one period without touching any other.
    ///
    /// An index at or past [`period_count`](Self::period_count) is a
    /// truncation error located just past the last decodable period.
    pub fn decode_period(&self, index: usize) -> Result<Period> {
        if index >= self.period_count {
            return Err(OutputError::Truncated {
                context: "period",
                offset: self.period_offset(self.period_count),
                needed: (index - self.period_count)
                    .checked_add(1)
                    .and_then(|n| n.checked_mul(self.stride()))
                    .unwrap_or(usize::MAX),
                available: 0,
            });
        }

        let offset = self.period_offset(index);
        let mut cursor = ByteCursor::at(self.bytes, offset, "period")?;
        let serial_days = cursor.read_f64("period timestamp")?;
        let timestamp = datetime::from_serial_days(serial_days).ok_or_else(|| {
            OutputError::format(
                offset,
                format!("timestamp {} is not a representable instant", serial_days),
            )
        })?;

        let mut values = vec![0f32; self.shape.values_per_period];
        cursor.read_f32_into(&mut values, "period values")?;
        trace!("Period {} at byte {}: {}", index, offset, timestamp);

        Ok(Period {
            index,
            offset,
            serial_days,
            timestamp,
            values: values.into_boxed_slice(),
            shape: self.shape.clone(),
        })
    }

    /// Decodes every period in order on the calling thread.
    pub fn decode_all(&self) -> Result<Vec<Period>> {
        (0..self.period_count).map(|p| self.decode_period(p)).collect()
    }

    /// Decodes every period on the rayon pool, `chunk` periods per task.
    ///
    /// `should_cancel` is polled before each chunk starts; once it returns
    /// true, the decode stops with [`OutputError::Cancelled`].
    pub fn decode_parallel<F>(&self, chunk: usize, should_cancel: F) -> Result<Vec<Period>>
    where
        F: Fn() -> bool + Sync,
    {
        let chunk = chunk.max(1);
        let mut slots: Vec<Option<Period>> = (0..self.period_count).map(|_| None).collect();

        slots
            .par_chunks_mut(chunk)
            .enumerate()
            .try_for_each(|(n, slots)| {
                let first = n * chunk;
                if should_cancel() {
                    return Err(OutputError::Cancelled {
                        period: first,
                        offset: self.period_offset(first),
                    });
                }
                for (i, slot) in slots.iter_mut().enumerate() {
                    *slot = Some(self.decode_period(first + i)?);
                }
                Ok(())
            })?;

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Checks that timestamps strictly increase.
///
/// With `step_millis` set, every increment that differs from it is logged; a
/// run may legitimately end on a shorter step, so this never fails.
pub fn check_timeline(periods: &[Period], step_millis: Option<i64>) -> Result<()> {
    let mut irregular = 0usize;
    for pair in periods.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        check_step(prev.timestamp, next)?;
        if let Some(step) = step_millis
            && (next.timestamp - prev.timestamp).num_milliseconds() != step
        {
            irregular += 1;
            debug!(
                "Period {} follows period {} after {} ms, reporting step is {} ms",
                next.index,
                prev.index,
                (next.timestamp - prev.timestamp).num_milliseconds(),
                step
            );
        }
    }
    if irregular > 0 {
        warn!(
            "{} of {} reporting intervals differ from the declared step",
            irregular,
            periods.len().saturating_sub(1)
        );
    }
    Ok(())
}

/// Fails if `next` does not come strictly after `prev`.
pub fn check_step(prev: NaiveDateTime, next: &Period) -> Result<()> {
    if next.timestamp <= prev {
        return Err(OutputError::format(
            next.offset,
            format!(
                "period {} timestamp {} does not follow {}",
                next.index, next.timestamp, prev
            ),
        ));
    }
    Ok(())
}

/// Regroups decoded periods into one series per entity.
pub fn assemble(periods: &[Period], shape: &PeriodShape, catalog: &EntityCatalog) -> ResultSet {
    let class_series = |class: EntityClass| -> ClassSeries {
        let Some(span) = shape.span(class) else {
            return ClassSeries::empty(class);
        };
        let names = catalog
            .names(class)
            .cloned()
            .unwrap_or_else(|| EntityNames::new(class, Vec::new()));

        let series = (0..span.entities)
            .filter_map(|entity| span.entity_range(entity))
            .map(|range| {
                let points = periods
                    .iter()
                    .map(|p| {
                        TimeSeriesPoint::new(
                            p.timestamp,
                            span.keys.clone(),
                            p.values[range.clone()].into(),
                        )
                    })
                    .collect();
                Series::new(points)
            })
            .collect();
        ClassSeries::new(names, series)
    };

    let system = Series::new(periods.iter().map(Period::system_point).collect());

    ResultSet {
        subcatchments: class_series(EntityClass::Subcatchment),
        nodes: class_series(EntityClass::Node),
        links: class_series(EntityClass::Link),
        system,
        timestamps: periods.iter().map(|p| p.timestamp).collect(),
    }
}
