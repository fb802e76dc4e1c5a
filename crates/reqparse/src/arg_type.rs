//! Type coercers attached to arguments.
//!
//! An [`ArgType`] wraps a function that turns a raw request [`Value`] into
//! the argument's value. Coercers come in two shapes, fixed when the
//! `ArgType` is built:
//!
//! | Constructor | Called with |
//! |-------------|-------------|
//! | [`ArgType::new`] | the raw value |
//! | [`ArgType::with_context`] | the raw value, the argument name and the matched operator |
//!
//! Errors only need to implement `Display`; the text becomes part of the
//! client-facing message.

use std::fmt;
use std::sync::Arc;

use reqparse_core::Value;
use reqparse_inputs::{InputError, IntRange};

type SimpleFn = dyn Fn(&Value) -> Result<Value, String> + Send + Sync;
type ContextFn = dyn Fn(&Value, &str, &str) -> Result<Value, String> + Send + Sync;

#[derive(Clone)]
enum Coercer {
    Simple(Arc<SimpleFn>),
    Contextual(Arc<ContextFn>),
}

/// A type coercer for an argument.
///
/// # Example
///
/// ```rust
/// use reqparse::ArgType;
/// use reqparse_core::Value;
///
/// let even = ArgType::new(|v: &Value| match v.as_str().and_then(|s| s.parse::<i64>().ok()) {
///     Some(n) if n % 2 == 0 => Ok(n),
///     _ => Err("expected an even number"),
/// });
///
/// assert_eq!(even.coerce(&Value::from("4"), "n", "="), Ok(Value::Int(4)));
/// assert!(even.coerce(&Value::from("3"), "n", "=").is_err());
/// ```
#[derive(Clone)]
pub struct ArgType {
    name: &'static str,
    coercer: Coercer,
}

impl ArgType {
    /// Wraps a coercer that only looks at the value.
    pub fn new<F, T, E>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<T, E> + Send + Sync + 'static,
        T: Into<Value>,
        E: fmt::Display,
    {
        Self {
            name: "custom",
            coercer: Coercer::Simple(Arc::new(move |value| {
                f(value).map(Into::into).map_err(|e| e.to_string())
            })),
        }
    }

    /// Wraps a coercer that also receives the argument name and operator.
    pub fn with_context<F, T, E>(f: F) -> Self
    where
        F: Fn(&Value, &str, &str) -> Result<T, E> + Send + Sync + 'static,
        T: Into<Value>,
        E: fmt::Display,
    {
        Self {
            name: "custom",
            coercer: Coercer::Contextual(Arc::new(move |value, name, operator| {
                f(value, name, operator)
                    .map(Into::into)
                    .map_err(|e| e.to_string())
            })),
        }
    }

    /// Sets the name shown by `Debug`.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Returns the coercer's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if the coercer receives the argument name and operator.
    #[must_use]
    pub fn takes_context(&self) -> bool {
        matches!(self.coercer, Coercer::Contextual(_))
    }

    /// Runs the coercer.
    ///
    /// # Errors
    ///
    /// Returns the coercer's error message.
    pub fn coerce(&self, value: &Value, name: &str, operator: &str) -> Result<Value, String> {
        match &self.coercer {
            Coercer::Simple(f) => f(value),
            Coercer::Contextual(f) => f(value, name, operator),
        }
    }

    /// Text. Numbers and booleans are formatted; lists and maps become JSON
    /// text. The default.
    #[must_use]
    pub fn string() -> Self {
        Self::new(|value: &Value| match value {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            Value::File(_) => Err("expected text, got an uploaded file".to_string()),
            other => Ok(Value::Str(other.to_string())),
        })
        .named("string")
    }

    /// Signed integer, from a number or decimal text.
    #[must_use]
    pub fn integer() -> Self {
        Self::new(|value: &Value| integer_of(value).map_err(|e| e.to_string())).named("integer")
    }

    /// Floating point number, from a number or text.
    #[must_use]
    pub fn float() -> Self {
        Self::new(|value: &Value| match value {
            Value::Int(_) | Value::Float(_) => value
                .as_f64()
                .ok_or_else(|| format!("could not convert to float: '{value}'")),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("could not convert string to float: '{s}'")),
            other => Err(format!("could not convert {} to float", other.type_name())),
        })
        .named("float")
    }

    /// Boolean; see [`reqparse_inputs::boolean`].
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(|value: &Value| match value {
            Value::Bool(b) => reqparse_inputs::boolean(*b),
            Value::Str(s) => reqparse_inputs::boolean(s.as_str()),
            Value::Int(n) => reqparse_inputs::boolean(n.to_string()),
            other => Err(InputError::InvalidBoolean(other.to_string())),
        })
        .named("boolean")
    }

    /// Integer `>= 0`.
    #[must_use]
    pub fn natural() -> Self {
        Self::new(|value: &Value| integer_of(value).and_then(reqparse_inputs::natural))
            .named("natural")
    }

    /// Integer `>= 1`.
    #[must_use]
    pub fn positive() -> Self {
        Self::new(|value: &Value| integer_of(value).and_then(reqparse_inputs::positive))
            .named("positive")
    }

    /// Integer within `low..=high`; errors name the argument.
    #[must_use]
    pub fn int_range(low: i64, high: i64) -> Self {
        Self::from(IntRange::new(low, high))
    }

    /// `YYYY-MM-DD` date, year 1900 or later.
    #[must_use]
    pub fn date() -> Self {
        Self::new(|value: &Value| match value {
            Value::Date(d) => Ok(*d),
            Value::Str(s) => reqparse_inputs::date(s),
            other => Err(InputError::InvalidDate(other.to_string())),
        })
        .named("date")
    }

    /// Absolute URL, returned unchanged.
    #[must_use]
    pub fn url() -> Self {
        Self::new(|value: &Value| match value {
            Value::Str(s) => reqparse_inputs::url(s),
            other => reqparse_inputs::url(&other.to_string()),
        })
        .named("url")
    }

    /// RFC 822 datetime, normalized to UTC.
    #[must_use]
    pub fn datetime_rfc822() -> Self {
        Self::new(|value: &Value| match value {
            Value::DateTime(dt) => Ok(*dt),
            other => reqparse_inputs::datetime_from_rfc822(&other.to_string()),
        })
        .named("datetime_rfc822")
    }

    /// ISO 8601 datetime, normalized to UTC.
    #[must_use]
    pub fn datetime_iso8601() -> Self {
        Self::new(|value: &Value| match value {
            Value::DateTime(dt) => Ok(*dt),
            other => reqparse_inputs::datetime_from_iso8601(&other.to_string()),
        })
        .named("datetime_iso8601")
    }

    /// ISO 8601 interval, as [`Value::Interval`].
    #[must_use]
    pub fn iso8601interval() -> Self {
        Self::new(|value: &Value| match value {
            Value::Interval(start, end) => Ok(Value::Interval(*start, *end)),
            other => reqparse_inputs::iso8601interval(&other.to_string()).map(Value::from),
        })
        .named("iso8601interval")
    }

    /// An uploaded file; anything else fails.
    #[must_use]
    pub fn file() -> Self {
        Self::new(|value: &Value| match value {
            Value::File(f) => Ok(Value::File(f.clone())),
            other => Err(format!("expected an uploaded file, got {}", other.type_name())),
        })
        .named("file")
    }

    /// The raw value, unchanged. Useful for JSON lists and objects.
    #[must_use]
    pub fn raw() -> Self {
        Self::new(|value: &Value| Ok::<_, String>(value.clone())).named("raw")
    }
}

fn integer_of(value: &Value) -> Result<i64, InputError> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Str(s) => reqparse_inputs::IntegerInput::to_integer(s.as_str()),
        #[allow(clippy::cast_possible_truncation)]
        Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e18 => Ok(*f as i64),
        other => Err(InputError::InvalidInteger(other.to_string())),
    }
}

impl Default for ArgType {
    fn default() -> Self {
        Self::string()
    }
}

impl From<IntRange> for ArgType {
    fn from(range: IntRange) -> Self {
        Self::with_context(move |value: &Value, name: &str, _operator: &str| {
            integer_of(value).and_then(|n| range.clone().named(name).check(n))
        })
        .named("int_range")
    }
}

impl fmt::Debug for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgType")
            .field("name", &self.name)
            .field("takes_context", &self.takes_context())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::{NaiveDate, TimeZone, Utc};
    use reqparse_core::UploadedFile;
    use std::sync::Mutex;

    fn coerce(t: &ArgType, value: impl Into<Value>) -> Result<Value, String> {
        t.coerce(&value.into(), "foo", "=")
    }

    #[test]
    fn test_string() {
        let t = ArgType::string();
        assert_eq!(coerce(&t, "bar"), Ok(Value::from("bar")));
        assert_eq!(coerce(&t, 1), Ok(Value::from("1")));
        assert_eq!(coerce(&t, true), Ok(Value::from("True")));
        assert_eq!(coerce(&t, "barß"), Ok(Value::from("barß")));
        assert!(!t.takes_context());
        assert_eq!(ArgType::default().name(), "string");
    }

    #[test]
    fn test_integer() {
        let t = ArgType::integer();
        assert_eq!(coerce(&t, "101"), Ok(Value::Int(101)));
        assert_eq!(coerce(&t, " 7 "), Ok(Value::Int(7)));
        assert_eq!(coerce(&t, 5), Ok(Value::Int(5)));
        assert_eq!(
            coerce(&t, "bar"),
            Err("invalid literal for int() with base 10: 'bar'".to_string())
        );
        assert_eq!(coerce(&t, 3.0), Ok(Value::Int(3)));
        assert!(coerce(&t, 2.5).is_err());
    }

    #[test]
    fn test_float() {
        let t = ArgType::float();
        assert_eq!(coerce(&t, "1.0025"), Ok(Value::Float(1.0025)));
        assert_eq!(coerce(&t, 2), Ok(Value::Float(2.0)));
        assert_eq!(
            coerce(&t, "abc"),
            Err("could not convert string to float: 'abc'".to_string())
        );
    }

    #[test]
    fn test_boolean() {
        let t = ArgType::boolean();
        assert_eq!(coerce(&t, "TRUE"), Ok(Value::Bool(true)));
        assert_eq!(coerce(&t, false), Ok(Value::Bool(false)));
        assert_eq!(coerce(&t, 1), Ok(Value::Bool(true)));
        assert_eq!(
            coerce(&t, "maybe"),
            Err("Invalid literal for boolean(): maybe".to_string())
        );
    }

    #[test]
    fn test_natural_and_positive() {
        assert_eq!(coerce(&ArgType::natural(), "0"), Ok(Value::Int(0)));
        assert!(coerce(&ArgType::natural(), -1).is_err());
        assert_eq!(coerce(&ArgType::positive(), 1), Ok(Value::Int(1)));
        assert_eq!(
            coerce(&ArgType::positive(), "0"),
            Err("Invalid argument: 0. argument must be a positive integer".to_string())
        );
    }

    #[test]
    fn test_int_range_names_argument() {
        let t = ArgType::int_range(1, 10);
        assert!(t.takes_context());
        assert_eq!(t.coerce(&Value::from("10"), "page", "="), Ok(Value::Int(10)));
        assert_eq!(
            t.coerce(&Value::from("11"), "page", "="),
            Err("Invalid page: 11. page must be within the range 1 - 10".to_string())
        );
    }

    #[test]
    fn test_date_and_datetimes() {
        assert_eq!(
            coerce(&ArgType::date(), "2008-08-01"),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2008, 8, 1).unwrap()))
        );
        assert!(coerce(&ArgType::date(), "2008-13-13").is_err());

        let expected = Utc.with_ymd_and_hms(2011, 1, 1, 23, 59, 59).unwrap();
        assert_eq!(
            coerce(&ArgType::datetime_rfc822(), "Sat, 01 Jan 2011 21:59:59 -0200"),
            Ok(Value::DateTime(expected))
        );
        assert_eq!(
            coerce(&ArgType::datetime_iso8601(), "2011-01-01T23:59:59+00:00"),
            Ok(Value::DateTime(expected))
        );
    }

    #[test]
    fn test_iso8601interval() {
        let start = Utc.with_ymd_and_hms(2013, 1, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2013, 1, 1, 13, 0, 0).unwrap();
        assert_eq!(
            coerce(&ArgType::iso8601interval(), "2013-01-01T12Z"),
            Ok(Value::Interval(start, end))
        );
        assert!(coerce(&ArgType::iso8601interval(), "asdf").is_err());
    }

    #[test]
    fn test_url() {
        assert_eq!(
            coerce(&ArgType::url(), "http://example.com/"),
            Ok(Value::from("http://example.com/"))
        );
        assert_eq!(
            coerce(&ArgType::url(), "example.com"),
            Err("example.com is not a valid URL. Did you mean: http://example.com".to_string())
        );
    }

    #[test]
    fn test_file() {
        let upload = UploadedFile::new(
            Some("foo".into()),
            Some("baz.txt".into()),
            None,
            Bytes::from_static(b"foo bar baz qux"),
        );
        assert_eq!(
            coerce(&ArgType::file(), upload.clone()),
            Ok(Value::File(upload))
        );
        assert_eq!(
            coerce(&ArgType::file(), "baz.txt"),
            Err("expected an uploaded file, got str".to_string())
        );
    }

    #[test]
    fn test_raw_keeps_structure() {
        let value = Value::from(serde_json::json!({"a": [1, 2]}));
        assert_eq!(ArgType::raw().coerce(&value, "foo", "="), Ok(value));
    }

    #[test]
    fn test_with_context_receives_name_and_operator() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&calls);
        let t = ArgType::with_context(move |value: &Value, name: &str, op: &str| {
            seen.lock()
                .unwrap()
                .push((value.to_string(), name.to_string(), op.to_string()));
            Ok::<_, String>(value.clone())
        });

        t.coerce(&Value::from("bar"), "foo", "<=").unwrap();
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[("bar".to_string(), "foo".to_string(), "<=".to_string())]
        );
    }

    #[test]
    fn test_debug_shows_name() {
        let debug = format!("{:?}", ArgType::boolean());
        assert!(debug.contains("boolean"));
    }
}
