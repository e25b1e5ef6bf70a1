//! Serial day-count timestamps.
//!
//! The engine stores instants as fractional days since 1899-12-30T00:00:00.
//! Conversion rounds to the nearest millisecond, so values written with a
//! limited number of decimals still land on whole seconds.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Day zero of the serial day count.
pub fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Convert a serial day count to a calendar instant.
///
/// Returns `None` for non-finite input or an instant chrono cannot represent.
pub fn from_serial_days(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }
    let millis = (days * MILLIS_PER_DAY).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    epoch().checked_add_signed(delta)
}

/// Inverse of [`from_serial_days`].
pub fn to_serial_days(instant: NaiveDateTime) -> f64 {
    (instant - epoch()).num_milliseconds() as f64 / MILLIS_PER_DAY
}
