//! ISO 8601 time intervals.
//!
//! Supported forms:
//!
//! | Form | Example |
//! |------|---------|
//! | `<start>/<end>` | `2013-01-01T12:00:00Z/2013-02-01T12:00:00Z` |
//! | `<start>/<duration>` | `2013-01-01T12:30:00Z/P1Y2M3DT4H5M6S` |
//! | `<duration>/<end>` | `P2D/2013-01-03T00:00:00Z` |
//! | `<timestamp>` | `2013-01-01T12Z` |
//!
//! A bare timestamp covers one unit of its own precision, so `2013-01-01T12Z`
//! is the hour `[12:00, 13:00)` and `2013-01-01` is the whole day.
//!
//! Durations use nominal lengths: a year is 365 days, a month 30 days and a
//! week 7 days.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::{InputError, InputResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

static TIMESTAMP_REGEX: OnceLock<Regex> = OnceLock::new();
static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();

fn timestamp_regex() -> &'static Regex {
    TIMESTAMP_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})",
            r"(?:T(?P<hour>[0-9]{2})(?::(?P<minute>[0-9]{2})(?::(?P<second>[0-9]{2})(?:[.,](?P<fraction>[0-9]+))?)?)?",
            r"(?P<offset>Z|[+-][0-9]{2}(?::?[0-9]{2})?)?)?$",
        ))
        .expect("valid timestamp regex")
    })
}

fn duration_regex() -> &'static Regex {
    DURATION_REGEX.get_or_init(|| {
        let n = r"[0-9]+(?:[.,][0-9]+)?";
        Regex::new(&format!(
            "^P(?:(?P<weeks>{n})W|(?:(?P<years>{n})Y)?(?:(?P<months>{n})M)?(?:(?P<days>{n})D)?\
             (?:T(?:(?P<hours>{n})H)?(?:(?P<minutes>{n})M)?(?:(?P<seconds>{n})S)?)?)$"
        ))
        .expect("valid duration regex")
    })
}

/// Resolution of a parsed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Precision {
    Day,
    Hour,
    Minute,
    Second,
}

impl Precision {
    fn unit(self) -> TimeDelta {
        match self {
            Self::Day => TimeDelta::days(1),
            Self::Hour => TimeDelta::hours(1),
            Self::Minute => TimeDelta::minutes(1),
            Self::Second => TimeDelta::seconds(1),
        }
    }
}

/// A UTC instant together with the precision it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Timestamp {
    pub(crate) instant: DateTime<Utc>,
    pub(crate) precision: Precision,
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text[1..].chars().filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_fraction(text: &str) -> Option<u32> {
    let mut digits: String = text.chars().take(9).collect();
    while digits.len() < 9 {
        digits.push('0');
    }
    digits.parse().ok()
}

/// Parses an extended-format ISO 8601 date or datetime.
pub(crate) fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let caps = timestamp_regex().captures(text)?;
    let date = NaiveDate::from_ymd_opt(
        number(&caps, "year")?,
        number(&caps, "month")?,
        number(&caps, "day")?,
    )?;

    let Some(hour) = number::<u32>(&caps, "hour") else {
        return Some(Timestamp {
            instant: Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            precision: Precision::Day,
        });
    };

    let minute = number::<u32>(&caps, "minute");
    let second = number::<u32>(&caps, "second");
    let nanos = match caps.name("fraction") {
        Some(m) => parse_fraction(m.as_str())?,
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(hour, minute.unwrap_or(0), second.unwrap_or(0), nanos)?;

    let offset = match caps.name("offset") {
        Some(m) => parse_offset(m.as_str())?,
        None => FixedOffset::east_opt(0)?,
    };
    let instant = offset
        .from_local_datetime(&date.and_time(time))
        .single()?
        .with_timezone(&Utc);

    let precision = if second.is_some() {
        Precision::Second
    } else if minute.is_some() {
        Precision::Minute
    } else {
        Precision::Hour
    };

    Some(Timestamp { instant, precision })
}

fn component(caps: &Captures<'_>, name: &str) -> Option<f64> {
    caps.name(name)
        .and_then(|m| m.as_str().replace(',', ".").parse().ok())
}

/// Parses an ISO 8601 duration into a fixed-length delta.
fn parse_duration(text: &str) -> Option<TimeDelta> {
    let caps = duration_regex().captures(text)?;

    let names = ["weeks", "years", "months", "days", "hours", "minutes", "seconds"];
    if names.iter().all(|name| caps.name(name).is_none()) {
        return None;
    }
    // A time designator must be followed by at least one time component
    let has_time = ["hours", "minutes", "seconds"]
        .iter()
        .any(|name| caps.name(name).is_some());
    if text.contains('T') && !has_time {
        return None;
    }

    let seconds = component(&caps, "weeks").unwrap_or(0.0) * 7.0 * SECONDS_PER_DAY
        + component(&caps, "years").unwrap_or(0.0) * 365.0 * SECONDS_PER_DAY
        + component(&caps, "months").unwrap_or(0.0) * 30.0 * SECONDS_PER_DAY
        + component(&caps, "days").unwrap_or(0.0) * SECONDS_PER_DAY
        + component(&caps, "hours").unwrap_or(0.0) * 3600.0
        + component(&caps, "minutes").unwrap_or(0.0) * 60.0
        + component(&caps, "seconds").unwrap_or(0.0);

    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let millis = millis as i64;
    TimeDelta::try_milliseconds(millis)
}

/// Parses an ISO 8601 interval into a `(start, end)` pair of UTC datetimes.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use reqparse_inputs::iso8601interval;
///
/// let (start, end) = iso8601interval("2013-01-01T12Z").unwrap();
/// assert_eq!(start, Utc.with_ymd_and_hms(2013, 1, 1, 12, 0, 0).unwrap());
/// assert_eq!(end, Utc.with_ymd_and_hms(2013, 1, 1, 13, 0, 0).unwrap());
///
/// assert!(iso8601interval("2013-01-01/blah").is_err());
/// ```
pub fn iso8601interval(value: &str) -> InputResult<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid = || InputError::invalid_interval(value);

    let parts: Vec<&str> = value.trim().split('/').collect();
    let (start, end) = match parts.as_slice() {
        [single] => {
            let ts = parse_timestamp(single).ok_or_else(invalid)?;
            let end = ts
                .instant
                .checked_add_signed(ts.precision.unit())
                .ok_or_else(invalid)?;
            (ts.instant, end)
        }
        [first, second] if first.starts_with('P') => {
            let duration = parse_duration(first).ok_or_else(invalid)?;
            let end = parse_timestamp(second).ok_or_else(invalid)?.instant;
            let start = end.checked_sub_signed(duration).ok_or_else(invalid)?;
            (start, end)
        }
        [first, second] => {
            let start = parse_timestamp(first).ok_or_else(invalid)?.instant;
            let end = if second.starts_with('P') {
                let duration = parse_duration(second).ok_or_else(invalid)?;
                start.checked_add_signed(duration).ok_or_else(invalid)?
            } else {
                parse_timestamp(second).ok_or_else(invalid)?.instant
            };
            (start, end)
        }
        _ => return Err(invalid()),
    };

    if end < start {
        return Err(invalid());
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_intervals() {
        let cases = [
            // Full precision with explicit UTC
            (
                "2013-01-01T12:30:00Z/P1Y2M3DT4H5M6S",
                (utc(2013, 1, 1, 12, 30, 0), utc(2014, 3, 5, 16, 35, 6)),
            ),
            // Alternate UTC indication
            (
                "2013-01-01T12:30+00:00/P2D",
                (utc(2013, 1, 1, 12, 30, 0), utc(2013, 1, 3, 12, 30, 0)),
            ),
            // Implicit UTC with time
            (
                "2013-01-01T15:00/P1M",
                (utc(2013, 1, 1, 15, 0, 0), utc(2013, 1, 31, 15, 0, 0)),
            ),
            // Offset conversion
            (
                "2013-01-01T17:00-05:00/P2W",
                (utc(2013, 1, 1, 22, 0, 0), utc(2013, 1, 15, 22, 0, 0)),
            ),
            // Date upgraded to midnight
            (
                "2013-01-01/P3D",
                (utc(2013, 1, 1, 0, 0, 0), utc(2013, 1, 4, 0, 0, 0)),
            ),
            (
                "2013-01-01T12:00:00Z/2013-02-01T12:00:00Z",
                (utc(2013, 1, 1, 12, 0, 0), utc(2013, 2, 1, 12, 0, 0)),
            ),
            (
                "2013-01-01/2013-06-30",
                (utc(2013, 1, 1, 0, 0, 0), utc(2013, 6, 30, 0, 0, 0)),
            ),
            (
                "2013-02-17T12:00:00-07:00/2013-02-28T15:00:00-07:00",
                (utc(2013, 2, 17, 19, 0, 0), utc(2013, 2, 28, 22, 0, 0)),
            ),
            (
                "2013-01-01T12:00:00.0/2013-01-01T12:30:00.000000",
                (utc(2013, 1, 1, 12, 0, 0), utc(2013, 1, 1, 12, 30, 0)),
            ),
            (
                "P2D/2013-01-03T00:00:00Z",
                (utc(2013, 1, 1, 0, 0, 0), utc(2013, 1, 3, 0, 0, 0)),
            ),
        ];

        for (text, expected) in cases {
            assert_eq!(iso8601interval(text), Ok(expected), "{text}");
        }
    }

    #[test]
    fn test_single_timestamp_expands_to_its_precision() {
        let cases = [
            ("2013-01-01T12:30:45Z", utc(2013, 1, 1, 12, 30, 45), utc(2013, 1, 1, 12, 30, 46)),
            ("2013-01-01T12:30:45+02:00", utc(2013, 1, 1, 10, 30, 45), utc(2013, 1, 1, 10, 30, 46)),
            ("2013-01-01T12:30:45", utc(2013, 1, 1, 12, 30, 45), utc(2013, 1, 1, 12, 30, 46)),
            ("2013-01-01T12:30+00:00", utc(2013, 1, 1, 12, 30, 0), utc(2013, 1, 1, 12, 31, 0)),
            ("2013-01-01T12:30+04:00", utc(2013, 1, 1, 8, 30, 0), utc(2013, 1, 1, 8, 31, 0)),
            ("2013-01-01T12:30", utc(2013, 1, 1, 12, 30, 0), utc(2013, 1, 1, 12, 31, 0)),
            ("2013-01-01T12Z", utc(2013, 1, 1, 12, 0, 0), utc(2013, 1, 1, 13, 0, 0)),
            ("2013-01-01T12-07:00", utc(2013, 1, 1, 19, 0, 0), utc(2013, 1, 1, 20, 0, 0)),
            ("2013-01-01T12", utc(2013, 1, 1, 12, 0, 0), utc(2013, 1, 1, 13, 0, 0)),
            ("2013-01-01", utc(2013, 1, 1, 0, 0, 0), utc(2013, 1, 2, 0, 0, 0)),
        ];

        for (text, start, end) in cases {
            assert_eq!(iso8601interval(text), Ok((start, end)), "{text}");
        }
    }

    #[test]
    fn test_invalid_interval() {
        assert_eq!(
            iso8601interval("2013-01-01/blah"),
            Err(InputError::invalid_interval("2013-01-01/blah"))
        );
    }

    #[test]
    fn test_bad_intervals() {
        for text in ["2013-01T14:", "", "asdf", "01/01/2013", "P/2013-01-01", "2013-01-01/PT"] {
            assert!(iso8601interval(text).is_err(), "{text} should be rejected");
        }
    }

    #[test]
    fn test_non_ascii_digits_are_rejected() {
        for text in ["\u{662}\u{660}\u{661}\u{663}-01-01", "2013-01-01/P\u{662}D"] {
            assert!(iso8601interval(text).is_err(), "{text} should be rejected");
        }
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        assert!(iso8601interval("2013-02-01/2013-01-01").is_err());
    }

    #[test]
    fn test_fractional_duration() {
        let (start, end) = iso8601interval("2013-01-01T00:00Z/PT1.5H").unwrap();
        assert_eq!(end - start, TimeDelta::minutes(90));
    }
}
