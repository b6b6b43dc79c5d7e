//! Typed extraction of desired-property values.
//!
//! Every extractor maps JSON `null` to `Ok(None)` ("restore the default").

use core::ops::RangeInclusive;

use serde_json::Value;

use crate::error::PropertyError;

pub const INTERVAL_SECS: RangeInclusive<u32> = 1..=86_400;
pub const PULSE_WIDTH: RangeInclusive<u32> = 1..=1000;
pub const PULSE_COUNT: RangeInclusive<u32> = 1..=0x7FFF_FFFF;
pub const DRIVE_SECS: RangeInclusive<u32> = 0..=86_400;
pub const CYCLE_SECS: RangeInclusive<u32> = 1..=86_400;
pub const DUTY_PERCENT: RangeInclusive<u32> = 0..=100;

pub fn boolean(value: &Value) -> Result<Option<bool>, PropertyError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        _ => Err(PropertyError::WrongType),
    }
}

pub fn number(value: &Value, range: RangeInclusive<u32>) -> Result<Option<u32>, PropertyError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| range.contains(n))
            .map(Some)
            .ok_or(PropertyError::OutOfRange),
        _ => Err(PropertyError::WrongType),
    }
}

/// Enumerated value given either by name or by numeric code.
pub fn variant<T>(
    value: &Value,
    from_name: impl Fn(&str) -> Option<T>,
    from_code: impl Fn(u64) -> Option<T>,
) -> Result<Option<T>, PropertyError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => from_name(s).map(Some).ok_or(PropertyError::UnknownVariant),
        Value::Number(n) => n
            .as_u64()
            .and_then(from_code)
            .map(Some)
            .ok_or(PropertyError::UnknownVariant),
        _ => Err(PropertyError::WrongType),
    }
}
