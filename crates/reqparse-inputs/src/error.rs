//! Coercion error types.
//!
//! Every message produced here is meant to be shown to API clients verbatim,
//! so the wording favours the caller's point of view over ours.

use thiserror::Error;

/// Result type alias using [`InputError`].
pub type InputResult<T> = Result<T, InputError>;

/// Error returned when a raw input cannot be coerced into its domain type.
///
/// # Example
///
/// ```
/// use reqparse_inputs::{boolean, InputError};
///
/// let err = boolean("maybe").unwrap_err();
/// assert_eq!(err, InputError::InvalidBoolean("maybe".to_string()));
/// assert_eq!(err.to_string(), "Invalid literal for boolean(): maybe");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The value is not one of the accepted boolean literals.
    #[error("Invalid literal for boolean(): {0}")]
    InvalidBoolean(String),

    /// The value could not be read as a base-10 integer.
    #[error("invalid literal for int() with base 10: '{0}'")]
    InvalidInteger(String),

    /// The integer is negative where a natural number was expected.
    #[error("Invalid argument: {value}. argument must be a non-negative integer")]
    NotNatural {
        /// The offending value.
        value: i64,
    },

    /// The integer is zero or negative where a positive number was expected.
    #[error("Invalid argument: {value}. argument must be a positive integer")]
    NotPositive {
        /// The offending value.
        value: i64,
    },

    /// The integer falls outside an inclusive range.
    #[error("Invalid {argument}: {value}. {argument} must be within the range {low} - {high}")]
    OutOfRange {
        /// Name of the argument, used in the message.
        argument: String,
        /// The offending value.
        value: i64,
        /// Inclusive lower bound.
        low: i64,
        /// Inclusive upper bound.
        high: i64,
    },

    /// The text is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date literal \"{0}\"")]
    InvalidDate(String),

    /// The date is earlier than the supported floor.
    #[error("Invalid date literal \"{0}\": year must be 1900 or later")]
    DateTooEarly(String),

    /// The text is not an absolute URL.
    #[error(
        "{value} is not a valid URL{}",
        .suggestion.as_ref().map(|s| format!(". Did you mean: {s}")).unwrap_or_default()
    )]
    InvalidUrl {
        /// The rejected value.
        value: String,
        /// A corrected form of the value, when one validates.
        suggestion: Option<String>,
    },

    /// The text is not a datetime in the named format.
    #[error("Invalid {format} date-time literal \"{value}\"")]
    InvalidDateTime {
        /// Format that was expected (`RFC 822`, `ISO 8601`).
        format: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The text is not an ISO 8601 interval.
    #[error("Invalid argument: {value}. argument must be a valid ISO8601 date/time interval.")]
    InvalidInterval {
        /// The rejected value.
        value: String,
    },
}

impl InputError {
    /// Creates an out-of-range error.
    #[must_use]
    pub fn out_of_range(argument: impl Into<String>, value: i64, low: i64, high: i64) -> Self {
        Self::OutOfRange {
            argument: argument.into(),
            value,
            low,
            high,
        }
    }

    /// Creates an invalid URL error, optionally carrying a suggested correction.
    #[must_use]
    pub fn invalid_url(value: impl Into<String>, suggestion: Option<String>) -> Self {
        Self::InvalidUrl {
            value: value.into(),
            suggestion,
        }
    }

    /// Creates an invalid interval error.
    #[must_use]
    pub fn invalid_interval(value: impl Into<String>) -> Self {
        Self::InvalidInterval {
            value: value.into(),
        }
    }
}
