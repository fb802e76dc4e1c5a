//! Request locations an argument can be read from.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use reqparse_core::{MultiDict, RequestSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named container on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Top-level members of a JSON object body.
    Json,
    /// The query string.
    Args,
    /// A urlencoded or multipart form body.
    Form,
    /// Query string and form body together.
    Values,
    /// HTTP headers.
    Headers,
    /// Cookies.
    Cookies,
    /// Uploaded files.
    Files,
    /// Parameters captured from the URL path.
    ViewArgs,
}

/// Locations searched when an argument doesn't declare any.
pub const DEFAULT_LOCATIONS: [Location; 2] = [Location::Json, Location::Values];

impl Location {
    /// Every location, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Json,
        Self::Args,
        Self::Form,
        Self::Values,
        Self::Headers,
        Self::Cookies,
        Self::Files,
        Self::ViewArgs,
    ];

    /// The identifier used in configuration and `FromStr`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Args => "args",
            Self::Form => "form",
            Self::Values => "values",
            Self::Headers => "headers",
            Self::Cookies => "cookies",
            Self::Files => "files",
            Self::ViewArgs => "view_args",
        }
    }

    /// Human-readable phrases used in "missing parameter" messages.
    #[must_use]
    pub fn phrases(self) -> &'static [&'static str] {
        match self {
            Self::Json | Self::Form => &["the post body"],
            Self::Args => &["the query string"],
            Self::Values => &["the post body", "the query string"],
            Self::Headers => &["the HTTP headers"],
            Self::Cookies => &["the request's cookies"],
            Self::Files => &["an uploaded file"],
            Self::ViewArgs => &["the URL path"],
        }
    }

    /// Reads this location's container off the request.
    #[must_use]
    pub fn container<'r>(self, request: &'r dyn RequestSource) -> Option<Cow<'r, MultiDict>> {
        match self {
            Self::Json => request.json(),
            Self::Args => request.args(),
            Self::Form => request.form(),
            Self::Values => request.values(),
            Self::Headers => request.headers(),
            Self::Cookies => request.cookies(),
            Self::Files => request.files(),
            Self::ViewArgs => request.view_args(),
        }
    }
}

/// Describes a list of locations for a client-facing message.
///
/// Phrases are de-duplicated in order and joined with `" or "`.
///
/// # Example
///
/// ```rust
/// use reqparse::{describe_locations, Location};
///
/// assert_eq!(
///     describe_locations(&[Location::Json, Location::Values]),
///     "the post body or the query string"
/// );
/// ```
#[must_use]
pub fn describe_locations(locations: &[Location]) -> String {
    let mut phrases: Vec<&str> = Vec::new();
    for &phrase in locations.iter().flat_map(|l| l.phrases()) {
        if !phrases.contains(&phrase) {
            phrases.push(phrase);
        }
    }
    phrases.join(" or ")
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown location name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown location: {0}")]
pub struct UnknownLocation(pub String);

impl FromStr for Location {
    type Err = UnknownLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "args" | "query" => Ok(Self::Args),
            "form" => Ok(Self::Form),
            "values" => Ok(Self::Values),
            "headers" => Ok(Self::Headers),
            "cookies" => Ok(Self::Cookies),
            "files" => Ok(Self::Files),
            "view_args" | "path" => Ok(Self::ViewArgs),
            other => Err(UnknownLocation(other.to_string())),
        }
    }
}
