//! Request decoding errors.
//!
//! These cover failures to turn raw request parts into multi-valued
//! containers. Argument validation errors live in the `reqparse` crate.

use http::StatusCode;
use thiserror::Error;

/// Result type alias using [`RequestError`].
pub type RequestResult<T> = Result<T, RequestError>;

/// Error that occurs while decoding a request.
///
/// # Example
///
/// ```rust
/// use reqparse_core::RequestError;
/// use http::StatusCode;
///
/// let err = RequestError::payload_too_large(1024, 2048);
/// assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
/// assert!(err.to_string().contains("2048"));
/// ```
#[derive(Error, Debug)]
pub enum RequestError {
    /// A body section is larger than the configured limit.
    #[error("payload too large: max {max} bytes, got {actual} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes.
        max: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// A part of the request could not be decoded.
    #[error("failed to decode {part}: {message}")]
    Malformed {
        /// Which part of the request was being decoded.
        part: &'static str,
        /// What went wrong.
        message: String,
    },

    /// A part of the request is not valid UTF-8.
    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    /// The content type does not allow the requested decoding.
    #[error("unsupported content type: expected '{expected}', got '{actual}'")]
    UnsupportedMediaType {
        /// Expected content type.
        expected: &'static str,
        /// Actual content type, or `none`.
        actual: String,
    },
}

impl RequestError {
    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(max: usize, actual: usize) -> Self {
        Self::PayloadTooLarge { max, actual }
    }

    /// Creates an error for a part that failed to decode.
    #[must_use]
    pub fn malformed(part: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            part,
            message: message.into(),
        }
    }

    /// Creates an error for an unexpected content type.
    #[must_use]
    pub fn unsupported_media_type(expected: &'static str, actual: Option<&str>) -> Self {
        Self::UnsupportedMediaType {
            expected,
            actual: actual.unwrap_or("none").to_string(),
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Malformed { .. } | Self::InvalidUtf8(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}
