//! # reqparse core
//!
//! The request model that argument parsers read from.
//!
//! Every location of an HTTP request is decoded into a [`MultiDict`] of
//! [`Value`]s and exposed through the [`RequestSource`] trait:
//!
//! | Location | Method | Decoded from |
//! |----------|--------|--------------|
//! | Query string | [`RequestSource::args`] | URI query, urlencoded |
//! | Form body | [`RequestSource::form`] | `application/x-www-form-urlencoded` or multipart text parts |
//! | Query + form | [`RequestSource::values`] | both of the above, query first |
//! | JSON body | [`RequestSource::json`] | top-level members of an `application/json` object |
//! | Headers | [`RequestSource::headers`] | header map, case-insensitive keys |
//! | Cookies | [`RequestSource::cookies`] | `Cookie` headers |
//! | Path | [`RequestSource::view_args`] | router captures |
//! | Files | [`RequestSource::files`] | multipart parts with a file name |
//!
//! [`RequestContext`] implements the trait for `http` requests. The
//! [`current`] module binds a request to the running thread so parsers can
//! find it without being handed one.
//!
//! ## Example
//!
//! ```rust
//! use reqparse_core::{RequestContext, RequestSource, Value};
//! use http::Method;
//!
//! let ctx = RequestContext::builder()
//!     .method(Method::POST)
//!     .uri("/users?notify=true".parse().unwrap())
//!     .header("content-type", "application/x-www-form-urlencoded")
//!     .body("name=alice&role=admin&role=ops")
//!     .build()
//!     .unwrap();
//!
//! let values = ctx.values().unwrap();
//! assert_eq!(values.get("notify"), Some(&Value::from("true")));
//! assert_eq!(values.get_all("role").count(), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/reqparse-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cookie;
pub mod current;
mod error;
mod files;
mod multidict;
mod request;
mod value;

pub use cookie::parse_cookies;
pub use error::{RequestError, RequestResult};
pub use files::{
    read_multipart, MultipartConfig, MultipartParts, UploadedFile, DEFAULT_MAX_FIELD_SIZE,
    DEFAULT_MAX_BODY_SIZE as DEFAULT_MAX_MULTIPART_SIZE,
};
pub use multidict::MultiDict;
pub use request::{RequestContext, RequestContextBuilder, RequestSource, DEFAULT_MAX_BODY_SIZE};
pub use value::{Comparison, Value};
