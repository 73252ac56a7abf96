//! .NET-compatible tick conversions
//!
//! A tick is 100 nanoseconds. `DateTime` values count ticks since
//! 0001-01-01T00:00:00 (UTC assumed); `TimeSpan` values are signed tick counts.
//! Sub-tick precision is truncated.

use crate::errors::TicksError;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between 0001-01-01 and 1970-01-01
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Ticks at 9999-12-31T23:59:59.9999999
pub const MAX_TICKS: i64 = 3_155_378_975_999_999_999;

pub fn datetime_to_ticks(value: NaiveDateTime) -> Result<i64, TicksError> {
    let utc = value.and_utc();
    let nanos = i64::from(utc.timestamp_subsec_nanos());

    let ticks = utc
        .timestamp()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|t| t.checked_add(UNIX_EPOCH_TICKS))
        .and_then(|t| t.checked_add(nanos / 100))
        .ok_or_else(|| TicksError::Overflow {
            value: value.to_string(),
        })?;

    if !(0..=MAX_TICKS).contains(&ticks) {
        return Err(TicksError::OutOfRange {
            ticks,
            max: MAX_TICKS,
        });
    }
    Ok(ticks)
}

pub fn ticks_to_datetime(ticks: i64) -> Result<NaiveDateTime, TicksError> {
    if !(0..=MAX_TICKS).contains(&ticks) {
        return Err(TicksError::OutOfRange {
            ticks,
            max: MAX_TICKS,
        });
    }

    let relative = ticks - UNIX_EPOCH_TICKS;
    let secs = relative.div_euclid(TICKS_PER_SECOND);
    let nanos = (relative.rem_euclid(TICKS_PER_SECOND) * 100) as u32;

    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|dt| dt.naive_utc())
        .ok_or(TicksError::OutOfRange {
            ticks,
            max: MAX_TICKS,
        })
}

pub fn timespan_to_ticks(value: TimeDelta) -> Result<i64, TicksError> {
    let nanos = i64::from(value.subsec_nanos());
    value
        .num_seconds()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|t| t.checked_add(nanos / 100))
        .ok_or_else(|| TicksError::Overflow {
            value: value.to_string(),
        })
}

pub fn ticks_to_timespan(ticks: i64) -> TimeDelta {
    TimeDelta::seconds(ticks.div_euclid(TICKS_PER_SECOND))
        + TimeDelta::nanoseconds(ticks.rem_euclid(TICKS_PER_SECOND) * 100)
}
