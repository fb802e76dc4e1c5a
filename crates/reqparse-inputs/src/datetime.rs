//! RFC 822 and ISO 8601 datetime formatting and parsing.
//!
//! Output is always normalized to UTC. Naive datetimes are taken to already
//! be in UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::interval::parse_timestamp;
use crate::{InputError, InputResult};

/// A datetime that can be normalized to UTC.
pub trait IntoUtc {
    /// Converts the value to a UTC datetime.
    fn into_utc(self) -> DateTime<Utc>;
}

impl IntoUtc for NaiveDateTime {
    fn into_utc(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self)
    }
}

impl<Tz: TimeZone> IntoUtc for DateTime<Tz> {
    fn into_utc(self) -> DateTime<Utc> {
        self.with_timezone(&Utc)
    }
}

/// Formats a datetime as RFC 822 text in UTC.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use reqparse_inputs::rfc822;
///
/// let dt = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(rfc822(dt), "Sat, 01 Jan 2011 00:00:00 -0000");
/// ```
pub fn rfc822(dt: impl IntoUtc) -> String {
    dt.into_utc()
        .format("%a, %d %b %Y %H:%M:%S -0000")
        .to_string()
}

/// Formats a datetime as ISO 8601 text in UTC.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use reqparse_inputs::iso8601;
///
/// let dt = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap().and_hms_opt(23, 59, 59).unwrap();
/// assert_eq!(iso8601(dt), "2011-01-01T23:59:59+00:00");
/// ```
pub fn iso8601(dt: impl IntoUtc) -> String {
    dt.into_utc().to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parses RFC 822 text into a UTC datetime.
pub fn datetime_from_rfc822(text: &str) -> InputResult<DateTime<Utc>> {
    let trimmed = text.trim();
    // "-0000" means "UTC, origin unknown"; read it as "+0000"
    let normalized = match trimmed.strip_suffix("-0000") {
        Some(head) => format!("{head}+0000"),
        None => trimmed.to_string(),
    };
    DateTime::parse_from_rfc2822(&normalized)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| InputError::InvalidDateTime {
            format: "RFC 822",
            value: text.to_string(),
        })
}

/// Parses ISO 8601 text into a UTC datetime.
///
/// A missing offset is read as UTC and a bare date as midnight.
pub fn datetime_from_iso8601(text: &str) -> InputResult<DateTime<Utc>> {
    parse_timestamp(text.trim())
        .map(|ts| ts.instant)
        .ok_or_else(|| InputError::InvalidDateTime {
            format: "ISO 8601",
            value: text.to_string(),
        })
}
