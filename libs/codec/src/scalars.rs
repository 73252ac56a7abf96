//! Built-in scalar encodings
//!
//! Fixed-width values are little-endian. `DateTime` and `TimeSpan` values are
//! .NET ticks, `Uuid` uses the .NET GUID byte layout. Each type also accepts
//! its canonical string form, which is what a reader falls back to when the
//! stream holds a string where the current type expects a binary frame.

use crate::error::{CodecError, CodecResult};
use crate::persist::Scalar;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use objgraph_types::{
    datetime_to_ticks, ticks_to_datetime, ticks_to_timespan, timespan_to_ticks, ScalarKind,
    TICKS_PER_SECOND,
};
use std::borrow::Cow;
use uuid::Uuid;

fn fixed<const N: usize>(frame: &[u8]) -> Result<[u8; N], String> {
    frame
        .try_into()
        .map_err(|_| format!("expected {N} bytes, got {}", frame.len()))
}

macro_rules! le_scalar {
    ($ty:ty, $kind:ident, $name:literal, $width:literal) => {
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;
            const TYPE_NAME: &'static str = $name;
            const ASSEMBLY: &'static str = "core";

            fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>> {
                Ok(Cow::Owned(self.to_le_bytes().to_vec()))
            }

            fn from_frame(frame: &[u8]) -> Result<Self, String> {
                fixed::<$width>(frame).map(<$ty>::from_le_bytes)
            }

            fn from_canonical(text: &str) -> Result<Self, String> {
                text.trim()
                    .parse::<$ty>()
                    .map_err(|e| format!("'{text}' is not a valid {}: {e}", $name))
            }
        }

        crate::__scalar_value!($ty);
    };
}

le_scalar!(i32, Int32, "i32", 4);
le_scalar!(i64, Int64, "i64", 8);
le_scalar!(u64, UInt64, "u64", 8);
le_scalar!(f64, Float64, "f64", 8);

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;
    const TYPE_NAME: &'static str = "bool";
    const ASSEMBLY: &'static str = "core";

    fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>> {
        Ok(Cow::Owned(vec![u8::from(*self)]))
    }

    fn from_frame(frame: &[u8]) -> Result<Self, String> {
        match frame {
            [byte] => Ok(*byte != 0),
            _ => Err(format!("expected 1 byte, got {}", frame.len())),
        }
    }

    fn from_canonical(text: &str) -> Result<Self, String> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(format!("'{text}' is not a valid bool")),
        }
    }
}

crate::__scalar_value!(bool);

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::String;
    const TYPE_NAME: &'static str = "String";
    const ASSEMBLY: &'static str = "alloc";

    fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }

    fn from_frame(frame: &[u8]) -> Result<Self, String> {
        std::str::from_utf8(frame)
            .map(str::to_string)
            .map_err(|e| format!("frame is not UTF-8 text: {e}"))
    }

    fn from_canonical(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }
}

crate::__scalar_value!(String);

fn ticks_frame(ticks: i64) -> Cow<'static, [u8]> {
    Cow::Owned(ticks.to_le_bytes().to_vec())
}

fn frame_ticks(frame: &[u8]) -> Result<i64, String> {
    fixed::<8>(frame).map(i64::from_le_bytes)
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, String> {
    let text = text.trim();
    text.parse::<NaiveDateTime>()
        .or_else(|_| DateTime::parse_from_rfc3339(text).map(|dt| dt.naive_utc()))
        .map_err(|e| format!("'{text}' is not an ISO-8601 date/time: {e}"))
}

impl Scalar for NaiveDateTime {
    const KIND: ScalarKind = ScalarKind::DateTime;
    const TYPE_NAME: &'static str = "NaiveDateTime";
    const ASSEMBLY: &'static str = "chrono";

    fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>> {
        datetime_to_ticks(*self)
            .map(ticks_frame)
            .map_err(|e| CodecError::unencodable(Self::TYPE_NAME, e))
    }

    fn from_frame(frame: &[u8]) -> Result<Self, String> {
        ticks_to_datetime(frame_ticks(frame)?).map_err(|e| e.to_string())
    }

    fn from_canonical(text: &str) -> Result<Self, String> {
        parse_datetime(text)
    }
}

crate::__scalar_value!(NaiveDateTime);

impl Scalar for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::DateTime;
    const TYPE_NAME: &'static str = "DateTime<Utc>";
    const ASSEMBLY: &'static str = "chrono";

    fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>> {
        datetime_to_ticks(self.naive_utc())
            .map(ticks_frame)
            .map_err(|e| CodecError::unencodable(Self::TYPE_NAME, e))
    }

    fn from_frame(frame: &[u8]) -> Result<Self, String> {
        ticks_to_datetime(frame_ticks(frame)?)
            .map(|dt| dt.and_utc())
            .map_err(|e| e.to_string())
    }

    fn from_canonical(text: &str) -> Result<Self, String> {
        parse_datetime(text).map(|dt| dt.and_utc())
    }
}

crate::__scalar_value!(DateTime<Utc>);

/// Parse the `[-][d.]hh:mm:ss[.fffffff]` time span form
fn parse_timespan(text: &str) -> Result<TimeDelta, String> {
    let trimmed = text.trim();
    let invalid = || format!("'{text}' is not a [-][d.]hh:mm:ss[.fffffff] time span");

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let [hours, minutes, seconds] = parts[..] else {
        return Err(invalid());
    };
    let (days, hours) = hours.split_once('.').unwrap_or(("0", hours));
    let (seconds, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));

    if fraction.len() > 7 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let number = |s: &str| s.parse::<i64>().map_err(|_| invalid());
    let fraction_ticks = if fraction.is_empty() {
        0
    } else {
        number(fraction)? * 10_i64.pow(7 - fraction.len() as u32)
    };

    let (days, hours, minutes, seconds) = (
        number(days)?,
        number(hours)?,
        number(minutes)?,
        number(seconds)?,
    );
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    let ticks = days
        .checked_mul(24)
        .and_then(|h| h.checked_add(hours))
        .and_then(|h| h.checked_mul(60))
        .and_then(|m| m.checked_add(minutes))
        .and_then(|m| m.checked_mul(60))
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(TICKS_PER_SECOND))
        .and_then(|t| t.checked_add(fraction_ticks))
        .ok_or_else(invalid)?;

    Ok(ticks_to_timespan(if negative { -ticks } else { ticks }))
}

impl Scalar for TimeDelta {
    const KIND: ScalarKind = ScalarKind::TimeSpan;
    const TYPE_NAME: &'static str = "TimeDelta";
    const ASSEMBLY: &'static str = "chrono";

    fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>> {
        timespan_to_ticks(*self)
            .map(ticks_frame)
            .map_err(|e| CodecError::unencodable(Self::TYPE_NAME, e))
    }

    fn from_frame(frame: &[u8]) -> Result<Self, String> {
        frame_ticks(frame).map(ticks_to_timespan)
    }

    fn from_canonical(text: &str) -> Result<Self, String> {
        parse_timespan(text)
    }
}

crate::__scalar_value!(TimeDelta);

impl Scalar for Uuid {
    const KIND: ScalarKind = ScalarKind::Guid;
    const TYPE_NAME: &'static str = "Uuid";
    const ASSEMBLY: &'static str = "uuid";

    fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>> {
        Ok(Cow::Owned(self.to_bytes_le().to_vec()))
    }

    fn from_frame(frame: &[u8]) -> Result<Self, String> {
        fixed::<16>(frame).map(Uuid::from_bytes_le)
    }

    fn from_canonical(text: &str) -> Result<Self, String> {
        Uuid::parse_str(text.trim()).map_err(|e| e.to_string())
    }
}

crate::__scalar_value!(Uuid);

impl Scalar for Bytes {
    const KIND: ScalarKind = ScalarKind::Bytes;
    const TYPE_NAME: &'static str = "Bytes";
    const ASSEMBLY: &'static str = "bytes";

    fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_ref()))
    }

    fn from_frame(frame: &[u8]) -> Result<Self, String> {
        Ok(Bytes::copy_from_slice(frame))
    }

    /// Hex text. Frames always convert directly, so stream decoding never
    /// reaches this; it serves callers constructing from a string.
    fn from_canonical(text: &str) -> Result<Self, String> {
        hex::decode(text.trim())
            .map(Bytes::from)
            .map_err(|e| e.to_string())
    }
}

crate::__scalar_value!(Bytes);
