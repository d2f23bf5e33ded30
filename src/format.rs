//! Conversion between millisecond counts and `HH:MM:SS:mmm` strings.
//!
//! Every display in this crate is derived from an integer millisecond count
//! through [`to_time_components`]. The reverse direction, [`parse_time_string`],
//! turns the six digits typed into a timer back into milliseconds.
//!
//! ```rust
//! use clockface_widgets::format::{parse_time_string, to_time_components};
//!
//! let ms = parse_time_string("010203").unwrap();
//! assert_eq!(ms, 3_723_000);
//! assert_eq!(to_time_components(ms as i64).unwrap().time_string, "01:02:03:000");
//! ```

use crate::error::FormatError;
use std::any::Any;
use std::fmt;
use std::time::Duration;

/// The zero display every widget starts from.
pub const ZERO_TIME_STRING: &str = "00:00:00:000";

/// Zero-padded pieces of a millisecond count.
///
/// Hours wrap at 24, so this is a time-of-day shaped value rather than an
/// unbounded duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeComponents {
    /// Hours mod 24, two digits.
    pub hours: String,
    /// Minutes, two digits.
    pub minutes: String,
    /// Seconds, two digits.
    pub seconds: String,
    /// Milliseconds, three digits.
    pub milliseconds: String,
    /// `HH:MM:SS:mmm`
    pub time_string: String,
}

impl TimeComponents {
    /// The all-zero value, `00:00:00:000`.
    pub fn zero() -> Self {
        Self {
            hours: "00".to_string(),
            minutes: "00".to_string(),
            seconds: "00".to_string(),
            milliseconds: "000".to_string(),
            time_string: ZERO_TIME_STRING.to_string(),
        }
    }
}

impl Default for TimeComponents {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for TimeComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.time_string)
    }
}

/// Splits a millisecond count into zero-padded hours, minutes, seconds and
/// milliseconds.
///
/// # Errors
///
/// Returns [`FormatError::InvalidInput`] when `delta_ms` is negative.
///
/// # Examples
///
/// ```rust
/// use clockface_widgets::format::to_time_components;
///
/// let t = to_time_components(3_723_004).unwrap();
/// assert_eq!(t.hours, "01");
/// assert_eq!(t.milliseconds, "004");
/// assert_eq!(t.time_string, "01:02:03:004");
///
/// // 25 hours wraps around to 01
/// assert_eq!(to_time_components(90_061_000).unwrap().hours, "01");
///
/// assert!(to_time_components(-1).is_err());
/// ```
pub fn to_time_components(delta_ms: i64) -> Result<TimeComponents, FormatError> {
    if delta_ms < 0 {
        return Err(FormatError::InvalidInput { delta_ms });
    }

    let millis = delta_ms % 1000;
    let total_secs = delta_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = (total_mins / 60) % 24;

    let hours = format!("{:02}", hours);
    let minutes = format!("{:02}", mins);
    let seconds = format!("{:02}", secs);
    let milliseconds = format!("{:03}", millis);
    let time_string = format!("{}:{}:{}:{}", hours, minutes, seconds, milliseconds);

    Ok(TimeComponents {
        hours,
        minutes,
        seconds,
        milliseconds,
        time_string,
    })
}

/// Converts a six character `HHMMSS` string into milliseconds.
///
/// The individual fields are not range checked: `"009900"` is 99 minutes.
///
/// # Errors
///
/// - [`FormatError::InvalidLength`] if `s` is not exactly six characters.
/// - [`FormatError::InvalidField`] if a field is not a number.
pub fn parse_time_string(s: &str) -> Result<u64, FormatError> {
    let len = s.chars().count();
    if len != 6 {
        return Err(FormatError::InvalidLength { len });
    }

    let hours = parse_field(s, 0..2, "hours")?;
    let minutes = parse_field(s, 2..4, "minutes")?;
    let seconds = parse_field(s, 4..6, "seconds")?;

    Ok(((hours * 60 + minutes) * 60 + seconds) * 1000)
}

/// Like [`parse_time_string`], but accepts any value, such as the payload of
/// a `bubbletea_rs::Msg`.
///
/// # Errors
///
/// [`FormatError::TypeMismatch`] unless `input` is a `String` or `&str`,
/// otherwise the errors of [`parse_time_string`].
///
/// ```rust
/// use clockface_widgets::format::parse_time_value;
/// use clockface_widgets::FormatError;
///
/// assert_eq!(parse_time_value(&"000010"), Ok(10_000));
/// assert_eq!(parse_time_value(&123456), Err(FormatError::TypeMismatch));
/// ```
pub fn parse_time_value(input: &(dyn Any + Send)) -> Result<u64, FormatError> {
    if let Some(s) = input.downcast_ref::<String>() {
        return parse_time_string(s);
    }
    if let Some(s) = input.downcast_ref::<&str>() {
        return parse_time_string(s);
    }
    Err(FormatError::TypeMismatch)
}

fn parse_field(
    s: &str,
    range: std::ops::Range<usize>,
    field: &'static str,
) -> Result<u64, FormatError> {
    // Multi-byte input can pass the length check but not slice cleanly.
    let value = s.get(range).ok_or_else(|| FormatError::InvalidField {
        field,
        value: s.to_string(),
    })?;
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    value.parse::<u64>().map_err(|_| FormatError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Whole milliseconds in `d`, saturating at `i64::MAX`.
pub(crate) fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// Renders a duration, for the widgets that only hold non-negative values.
pub(crate) fn components_of(d: Duration) -> TimeComponents {
    // millis() is never negative, so the conversion cannot fail.
    to_time_components(millis(d)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        let t = to_time_components(0).unwrap();
        assert_eq!(t.hours, "00");
        assert_eq!(t.minutes, "00");
        assert_eq!(t.seconds, "00");
        assert_eq!(t.milliseconds, "000");
        assert_eq!(t.time_string, "00:00:00:000");
        assert_eq!(t, TimeComponents::zero());
    }

    #[test]
    fn test_padding() {
        let t = to_time_components(3_723_004).unwrap();
        assert_eq!(t.time_string, "01:02:03:004");
        assert_eq!(t.to_string(), "01:02:03:004");
    }

    #[test]
    fn test_hours_wrap_at_24() {
        // 90_061_000ms is 25h 1m 1s, 25 mod 24 = 1
        let t = to_time_components(90_061_000).unwrap();
        assert_eq!(t.hours, "01");
        assert_eq!(t.time_string, "01:01:01:000");

        let t = to_time_components(24 * 3_600_000).unwrap();
        assert_eq!(t.time_string, "00:00:00:000");

        let t = to_time_components(24 * 3_600_000 - 1).unwrap();
        assert_eq!(t.time_string, "23:59:59:999");
    }

    #[test]
    fn test_negative_is_invalid_input() {
        assert_eq!(
            to_time_components(-1),
            Err(FormatError::InvalidInput { delta_ms: -1 })
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_time_string("010203"), Ok(3_723_000));
        assert_eq!(parse_time_string("000000"), Ok(0));
        // fields are not range checked
        assert_eq!(parse_time_string("009900"), Ok(99 * 60_000));
        assert_eq!(parse_time_string("999999"), Ok(((99 * 60 + 99) * 60 + 99) * 1000));
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(
            parse_time_string("12345"),
            Err(FormatError::InvalidLength { len: 5 })
        );
        assert_eq!(
            parse_time_string("1234567"),
            Err(FormatError::InvalidLength { len: 7 })
        );
        assert_eq!(
            parse_time_string(""),
            Err(FormatError::InvalidLength { len: 0 })
        );
    }

    #[test]
    fn test_parse_bad_fields() {
        assert!(matches!(
            parse_time_string("ab0000"),
            Err(FormatError::InvalidField { field: "hours", .. })
        ));
        assert!(matches!(
            parse_time_string("00+100"),
            Err(FormatError::InvalidField {
                field: "minutes",
                ..
            })
        ));
        assert!(matches!(
            parse_time_string("0000é0"),
            Err(FormatError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_parse_value_type_mismatch() {
        assert_eq!(parse_time_value(&123456), Err(FormatError::TypeMismatch));
        assert_eq!(parse_time_value(&123456u64), Err(FormatError::TypeMismatch));
        assert_eq!(parse_time_value(&"010203"), Ok(3_723_000));
        assert_eq!(parse_time_value(&"010203".to_string()), Ok(3_723_000));
        assert_eq!(
            parse_time_value(&"12345"),
            Err(FormatError::InvalidLength { len: 5 })
        );
    }

    #[test]
    fn test_round_trip_in_range() {
        for s in ["000000", "000001", "000059", "005959", "235959", "120000", "071530"] {
            let ms = parse_time_string(s).unwrap();
            let t = to_time_components(ms as i64).unwrap();
            let expected = format!("{}:{}:{}", &s[0..2], &s[2..4], &s[4..6]);
            assert_eq!(&t.time_string[..8], expected, "round trip of {}", s);
        }
    }

    #[test]
    fn test_components_of_duration() {
        assert_eq!(
            components_of(Duration::from_millis(3_300_000)).time_string,
            "00:55:00:000"
        );
        assert_eq!(millis(Duration::MAX), i64::MAX);
    }
}
