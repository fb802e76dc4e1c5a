//! Dynamically typed request values.
//!
//! Raw request data arrives as text (query strings, forms, headers), as
//! JSON, or as uploaded files. Coercers turn those into richer values such
//! as dates and intervals. [`Value`] carries all of them.

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::UploadedFile;

/// A value read from a request or produced by a coercer.
///
/// # Example
///
/// ```rust
/// use reqparse_core::Value;
///
/// let value = Value::from(serde_json::json!({"ids": [1, 2], "name": "bob"}));
/// let map = value.as_map().unwrap();
/// assert_eq!(map["ids"], Value::List(vec![Value::Int(1), Value::Int(2)]));
/// assert_eq!(map["name"].as_str(), Some("bob"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null (JSON `null`, or the result of a coercer that produced nothing).
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Calendar date.
    Date(NaiveDate),
    /// UTC datetime.
    DateTime(DateTime<Utc>),
    /// Half-open UTC interval `[start, end)`.
    Interval(DateTime<Utc>, DateTime<Utc>),
    /// Uploaded file.
    File(UploadedFile),
    /// Ordered list.
    List(Vec<Value>),
    /// Ordered string-keyed map.
    Map(IndexMap<String, Value>),
    /// Values collected per comparison operator by a filtering argument.
    Comparisons(Vec<Comparison>),
}

/// One operator/value pair collected by a filtering argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// The operator as declared on the argument, e.g. `>=`.
    pub operator: String,
    /// The raw value supplied for that operator.
    pub value: Value,
}

impl Comparison {
    /// Creates a comparison.
    #[must_use]
    pub fn new(operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            operator: operator.into(),
            value: value.into(),
        }
    }
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a bool.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an int.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number as a float if this is an int or a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the date if this is a date.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the datetime if this is a datetime.
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the bounds if this is an interval.
    #[must_use]
    pub fn as_interval(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::Interval(start, end) => Some((*start, *end)),
            _ => None,
        }
    }

    /// Returns the upload if this is a file.
    #[must_use]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the items if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the comparisons if this was produced by a filtering argument.
    #[must_use]
    pub fn as_comparisons(&self) -> Option<&[Comparison]> {
        match self {
            Self::Comparisons(c) => Some(c),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Interval(..) => "interval",
            Self::File(_) => "file",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Comparisons(_) => "comparisons",
        }
    }

    /// Returns a copy with string content lowercased.
    ///
    /// Lists are lowercased element by element; other values are returned
    /// unchanged.
    #[must_use]
    pub fn to_lowercase(&self) -> Self {
        match self {
            Self::Str(s) => Self::Str(s.to_lowercase()),
            Self::List(items) => Self::List(items.iter().map(Self::to_lowercase).collect()),
            other => other.clone(),
        }
    }

    /// Returns a copy with surrounding whitespace removed from string content.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        match self {
            Self::Str(s) => Self::Str(s.trim().to_string()),
            other => other.clone(),
        }
    }

    /// Converts to a JSON value.
    ///
    /// Dates and datetimes become ISO 8601 strings, intervals a two-element
    /// array, files an object describing the upload.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value as Json};

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(n) => json!(n),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Str(s) => Json::String(s.clone()),
            Self::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Json::String(format_datetime(dt)),
            Self::Interval(start, end) => {
                json!([format_datetime(start), format_datetime(end)])
            }
            Self::File(file) => json!({
                "name": file.name(),
                "filename": file.file_name(),
                "content_type": file.content_type(),
                "size": file.len(),
            }),
            Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Comparisons(items) => Json::Array(
                items
                    .iter()
                    .map(|c| json!({"operator": c.operator, "value": c.value.to_json()}))
                    .collect(),
            ),
        }
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => f.write_str(&format_datetime(dt)),
            Self::Interval(start, end) => {
                write!(f, "{}/{}", format_datetime(start), format_datetime(end))
            }
            Self::File(file) => write!(f, "{}", file.file_name().unwrap_or("<file>")),
            Self::List(_) | Self::Map(_) | Self::Comparisons(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    #[allow(clippy::option_if_let_else)]
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            Json::String(s) => Self::Str(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<(DateTime<Utc>, DateTime<Utc>)> for Value {
    fn from((start, end): (DateTime<Utc>, DateTime<Utc>)) -> Self {
        Self::Interval(start, end)
    }
}

impl From<UploadedFile> for Value {
    fn from(file: UploadedFile) -> Self {
        Self::File(file)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
