//! # reqparse inputs
//!
//! Typed-input coercers for request arguments.
//!
//! Each coercer is a pure function that turns raw request text (or an
//! already-typed value) into a domain value, or fails with an
//! [`InputError`] whose message can be returned to the client as is.
//!
//! | Coercer | Output | Accepts |
//! |---------|--------|---------|
//! | [`boolean`] | `bool` | `true`/`1`/`false`/`0` in any case, or a native `bool` |
//! | [`natural`] | `i64` | integers `>= 0` |
//! | [`positive`] | `i64` | integers `>= 1` |
//! | [`int_range`] / [`IntRange`] | `i64` | integers within inclusive bounds |
//! | [`date`] | [`NaiveDate`](chrono::NaiveDate) | `YYYY-MM-DD`, year 1900 or later |
//! | [`url`] | `String` | absolute `http(s)`/`ftp(s)` URLs |
//! | [`datetime_from_rfc822`] | `DateTime<Utc>` | `Sat, 01 Jan 2011 00:00:00 -0000` |
//! | [`datetime_from_iso8601`] | `DateTime<Utc>` | `2011-01-01T00:00:00+00:00` |
//! | [`iso8601interval`] | `(DateTime<Utc>, DateTime<Utc>)` | `start/end`, `start/duration`, `duration/end`, `timestamp` |
//!
//! [`rfc822`] and [`iso8601`] go the other way and format datetimes in UTC.
//!
//! ## Example
//!
//! ```rust
//! use reqparse_inputs::{boolean, int_range, iso8601interval, url};
//!
//! assert_eq!(boolean("True"), Ok(true));
//! assert_eq!(int_range(1, 10, "7", "page"), Ok(7));
//! assert!(url("example.com").is_err());
//!
//! let (start, end) = iso8601interval("2013-01-01/P3D").unwrap();
//! assert_eq!((end - start).num_days(), 3);
//! ```

#![doc(html_root_url = "https://docs.rs/reqparse-inputs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod datetime;
mod error;
mod interval;
mod scalar;
mod url;

pub use datetime::{datetime_from_iso8601, datetime_from_rfc822, iso8601, rfc822, IntoUtc};
pub use error::{InputError, InputResult};
pub use interval::iso8601interval;
pub use scalar::{
    boolean, date, int_range, natural, positive, BooleanInput, IntRange, IntegerInput,
    MIN_DATE_YEAR,
};
pub use url::{is_valid_url, url};
