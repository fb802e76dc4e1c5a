//! Boolean, integer and date coercers.

use chrono::{Datelike, NaiveDate};

use crate::{InputError, InputResult};

/// Earliest year accepted by [`date`].
pub const MIN_DATE_YEAR: i32 = 1900;

/// A value that can be read as a boolean.
///
/// Implemented for native booleans (passed through untouched) and for text,
/// which is matched case-insensitively against `true`/`1` and `false`/`0`.
pub trait BooleanInput {
    /// Reads the value as a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidBoolean`] for unrecognised text.
    fn to_boolean(&self) -> InputResult<bool>;
}

impl BooleanInput for bool {
    fn to_boolean(&self) -> InputResult<bool> {
        Ok(*self)
    }
}

impl BooleanInput for str {
    fn to_boolean(&self) -> InputResult<bool> {
        match self.to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(InputError::InvalidBoolean(self.to_string())),
        }
    }
}

impl BooleanInput for String {
    fn to_boolean(&self) -> InputResult<bool> {
        self.as_str().to_boolean()
    }
}

impl<T: BooleanInput + ?Sized> BooleanInput for &T {
    fn to_boolean(&self) -> InputResult<bool> {
        (**self).to_boolean()
    }
}

/// A value that can be read as a signed integer.
///
/// Text is trimmed and parsed in base 10.
pub trait IntegerInput {
    /// Reads the value as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidInteger`] for text that is not an integer.
    fn to_integer(&self) -> InputResult<i64>;
}

impl IntegerInput for i64 {
    fn to_integer(&self) -> InputResult<i64> {
        Ok(*self)
    }
}

impl IntegerInput for i32 {
    fn to_integer(&self) -> InputResult<i64> {
        Ok(i64::from(*self))
    }
}

impl IntegerInput for u32 {
    fn to_integer(&self) -> InputResult<i64> {
        Ok(i64::from(*self))
    }
}

impl IntegerInput for str {
    fn to_integer(&self) -> InputResult<i64> {
        self.trim()
            .parse()
            .map_err(|_| InputError::InvalidInteger(self.to_string()))
    }
}

impl IntegerInput for String {
    fn to_integer(&self) -> InputResult<i64> {
        self.as_str().to_integer()
    }
}

impl<T: IntegerInput + ?Sized> IntegerInput for &T {
    fn to_integer(&self) -> InputResult<i64> {
        (**self).to_integer()
    }
}

/// Parses a boolean.
///
/// # Example
///
/// ```
/// use reqparse_inputs::boolean;
///
/// assert_eq!(boolean("TRUE"), Ok(true));
/// assert_eq!(boolean("0"), Ok(false));
/// assert_eq!(boolean(true), Ok(true));
/// assert!(boolean("yes").is_err());
/// ```
pub fn boolean(value: impl BooleanInput) -> InputResult<bool> {
    value.to_boolean()
}

/// Parses a non-negative integer.
pub fn natural(value: impl IntegerInput) -> InputResult<i64> {
    let value = value.to_integer()?;
    if value < 0 {
        return Err(InputError::NotNatural { value });
    }
    Ok(value)
}

/// Parses a strictly positive integer.
pub fn positive(value: impl IntegerInput) -> InputResult<i64> {
    let value = value.to_integer()?;
    if value < 1 {
        return Err(InputError::NotPositive { value });
    }
    Ok(value)
}

/// Parses an integer and checks it lies within `low..=high`.
///
/// `name` is only used to word the error message.
///
/// # Example
///
/// ```
/// use reqparse_inputs::int_range;
///
/// assert_eq!(int_range(1, 5, 5, "page"), Ok(5));
/// assert!(int_range(1, 5, "6", "page").is_err());
/// ```
pub fn int_range(low: i64, high: i64, value: impl IntegerInput, name: &str) -> InputResult<i64> {
    IntRange::new(low, high).named(name).check(value)
}

/// Reusable inclusive integer range check.
///
/// This is the curried form of [`int_range`]: configure the bounds once and
/// check many values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntRange {
    low: i64,
    high: i64,
    argument: String,
}

impl IntRange {
    /// Creates a range accepting `low..=high`.
    #[must_use]
    pub fn new(low: i64, high: i64) -> Self {
        Self {
            low,
            high,
            argument: "argument".to_string(),
        }
    }

    /// Sets the argument name used in error messages.
    #[must_use]
    pub fn named(mut self, argument: impl Into<String>) -> Self {
        self.argument = argument.into();
        self
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn low(&self) -> i64 {
        self.low
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn high(&self) -> i64 {
        self.high
    }

    /// Parses `value` and checks it against the bounds.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidInteger`] or [`InputError::OutOfRange`].
    pub fn check(&self, value: impl IntegerInput) -> InputResult<i64> {
        let value = value.to_integer()?;
        if value < self.low || value > self.high {
            return Err(InputError::out_of_range(
                &self.argument,
                value,
                self.low,
                self.high,
            ));
        }
        Ok(value)
    }
}

/// Parses a `YYYY-MM-DD` date no earlier than 1900-01-01.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use reqparse_inputs::date;
///
/// assert_eq!(date("2008-08-01"), Ok(NaiveDate::from_ymd_opt(2008, 8, 1).unwrap()));
/// assert!(date("2008-13-13").is_err());
/// assert!(date("0001-01-01").is_err());
/// ```
pub fn date(value: &str) -> InputResult<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(value.to_string()))?;
    if parsed.year() < MIN_DATE_YEAR {
        return Err(InputError::DateTooEarly(value.to_string()));
    }
    Ok(parsed)
}
