//! Argument and parse errors.
//!
//! [`ArgumentError`] describes one argument that failed; [`ParseError`] is
//! what [`RequestParser::parse_args`](crate::RequestParser::parse_args)
//! returns. At the HTTP boundary, [`ParseError::into_response`] produces the
//! client response:
//!
//! ```json
//! {"message": "Missing required parameter foo in the query string"}
//! ```
//!
//! or, when errors are bundled, one message per argument:
//!
//! ```json
//! {"message": {"foo": "...", "bar": "..."}}
//! ```

use bytes::Bytes;
use http::{header, HeaderValue, Response, StatusCode};
use indexmap::IndexMap;
use serde_json::json;
use thiserror::Error;

use crate::location::{describe_locations, Location};

/// Why an argument failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentErrorKind {
    /// A required argument was found in none of its locations.
    MissingRequired,
    /// The argument's type coercer rejected a value.
    TypeCoercion,
    /// A coerced value is not one of the allowed choices.
    InvalidChoice,
    /// An explicit null was given for a non-nullable argument.
    Null,
}

impl ArgumentErrorKind {
    /// Short machine-readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingRequired => "missing_required",
            Self::TypeCoercion => "type_coercion",
            Self::InvalidChoice => "invalid_choice",
            Self::Null => "null",
        }
    }
}

/// A single argument that failed to parse.
///
/// The message is client-facing; the argument's `help` text, when set, has
/// already been applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ArgumentError {
    /// Name of the argument.
    pub name: String,
    /// Failure category.
    pub kind: ArgumentErrorKind,
    /// Client-facing message.
    pub message: String,
}

impl ArgumentError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ArgumentErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            message: message.into(),
        }
    }

    /// The default message for a required argument found nowhere.
    #[must_use]
    pub fn missing_message(name: &str, locations: &[Location]) -> String {
        format!(
            "Missing required parameter {name} in {}",
            describe_locations(locations)
        )
    }
}

/// Error returned when a request fails to parse.
///
/// # Example
///
/// ```rust
/// use reqparse::{ArgumentError, ArgumentErrorKind, ParseError};
/// use http::StatusCode;
///
/// let err = ParseError::invalid(
///     ArgumentError::new("foo", ArgumentErrorKind::InvalidChoice, "three is not a valid choice"),
///     StatusCode::BAD_REQUEST,
/// );
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.body(), serde_json::json!({"message": "three is not a valid choice"}));
/// ```
#[derive(Debug, Error)]
pub enum ParseError {
    /// One argument failed (fail-fast mode).
    #[error("{error}")]
    Invalid {
        /// The failure.
        error: ArgumentError,
        /// Status to respond with.
        status: StatusCode,
    },

    /// One or more arguments failed (bundle mode), in declaration order.
    #[error("{} arguments failed to parse", .errors.len())]
    Bundle {
        /// The failures.
        errors: Vec<ArgumentError>,
        /// Status to respond with.
        status: StatusCode,
    },

    /// Strict mode found request keys no argument claimed.
    #[error("Unknown arguments: {}", .names.join(", "))]
    UnrecognizedArguments {
        /// The unclaimed keys, in order of first appearance.
        names: Vec<String>,
    },

    /// No request was passed and none is active on this thread.
    #[error("no request was given and none is active on this thread")]
    NoActiveRequest,
}

impl ParseError {
    /// Creates a fail-fast error.
    #[must_use]
    pub fn invalid(error: ArgumentError, status: StatusCode) -> Self {
        Self::Invalid { error, status }
    }

    /// Creates a bundle error.
    #[must_use]
    pub fn bundle(errors: Vec<ArgumentError>, status: StatusCode) -> Self {
        Self::Bundle { errors, status }
    }

    /// Creates a strict-mode error.
    #[must_use]
    pub fn unrecognized(names: Vec<String>) -> Self {
        Self::UnrecognizedArguments { names }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid { status, .. } | Self::Bundle { status, .. } => *status,
            Self::UnrecognizedArguments { .. } => StatusCode::BAD_REQUEST,
            Self::NoActiveRequest => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "INVALID_ARGUMENT",
            Self::Bundle { .. } => "INVALID_ARGUMENTS",
            Self::UnrecognizedArguments { .. } => "UNRECOGNIZED_ARGUMENTS",
            Self::NoActiveRequest => "NO_ACTIVE_REQUEST",
        }
    }

    /// Returns the argument failures carried by this error.
    #[must_use]
    pub fn errors(&self) -> &[ArgumentError] {
        match self {
            Self::Invalid { error, .. } => std::slice::from_ref(error),
            Self::Bundle { errors, .. } => errors,
            Self::UnrecognizedArguments { .. } | Self::NoActiveRequest => &[],
        }
    }

    /// Returns `{"message": ...}`: a string, or an object of per-argument
    /// messages for bundled errors.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Bundle { errors, .. } => {
                let messages: IndexMap<&str, &str> = errors
                    .iter()
                    .map(|e| (e.name.as_str(), e.message.as_str()))
                    .collect();
                json!({ "message": messages })
            }
            other => json!({ "message": other.to_string() }),
        }
    }

    /// Converts the error into a JSON HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(Bytes::from(self.body().to_string()));
        *response.status_mut() = self.status_code();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}
