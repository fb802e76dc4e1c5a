//! # reqparse
//!
//! Declarative request argument parsing.
//!
//! Declare the arguments an endpoint expects, then parse each request into a
//! result map. Every argument says where to look, how to coerce what it
//! finds, which values are allowed and what to store when it is missing.
//! Failures come back as a [`ParseError`] that renders to a JSON error
//! response.
//!
//! | Type | Role |
//! |------|------|
//! | [`Argument`] | One declared input: name, locations, type, choices, default, action |
//! | [`ArgType`] | Type coercer; built-ins wrap [`reqparse_inputs`] |
//! | [`Location`] | Request container: JSON body, query string, form, headers, cookies, files, path |
//! | [`RequestParser`] | Ordered argument list; fail-fast, bundled or strict parsing |
//! | [`Namespace`] | Default result map; any [`ResultMap`] works |
//! | [`ParserConfig`] | Application-wide switches, loaded by [`ConfigLoader`] |
//!
//! ## Example
//!
//! ```rust
//! use reqparse::{Action, ArgType, Argument, Location, RequestParser, Value};
//! use reqparse_core::RequestContext;
//! use http::StatusCode;
//!
//! let parser = RequestParser::new()
//!     .argument(Argument::new("rate").arg_type(ArgType::integer()).help("Rate cannot be converted"))
//!     .argument(Argument::new("tag").action(Action::Append).location(Location::Args))
//!     .argument(Argument::new("mode").choices(["fast", "safe"]).default("safe"));
//!
//! let ctx = RequestContext::builder()
//!     .uri("/todos?rate=5&tag=a&tag=b".parse().unwrap())
//!     .build()
//!     .unwrap();
//! let args = parser.parse_args(&ctx).unwrap();
//! assert_eq!(args["rate"], Value::Int(5));
//! assert_eq!(args["tag"], Value::from(vec!["a", "b"]));
//! assert_eq!(args["mode"], Value::from("safe"));
//!
//! let bad = RequestContext::builder()
//!     .uri("/todos?rate=fast".parse().unwrap())
//!     .build()
//!     .unwrap();
//! let err = parser.parse_args(&bad).unwrap_err();
//! assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
//! assert_eq!(err.body(), serde_json::json!({"message": "Rate cannot be converted"}));
//! ```
//!
//! ## Current request
//!
//! Handlers that don't hold the request can install it for the running
//! thread with [`current::scope`] and call
//! [`RequestParser::parse_args_with`] with `None`.

#![doc(html_root_url = "https://docs.rs/reqparse/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arg_type;
mod argument;
mod config;
mod error;
mod location;
mod namespace;
mod parser;

pub use arg_type::ArgType;
pub use argument::{Action, Argument, Choices, DefaultValue};
pub use config::{ConfigError, ConfigLoader, ParserConfig};
pub use error::{ArgumentError, ArgumentErrorKind, ParseError};
pub use location::{describe_locations, Location, UnknownLocation, DEFAULT_LOCATIONS};
pub use namespace::{Namespace, NamespaceError, ResultMap};
pub use parser::{ParseOptions, RequestParser};

// Re-export the request model and coercers
pub use reqparse_core::{
    current, Comparison, MultiDict, RequestContext, RequestSource, UploadedFile, Value,
};
pub use reqparse_inputs as inputs;
