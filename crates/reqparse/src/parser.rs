//! The request parser.
//!
//! A [`RequestParser`] holds an ordered list of [`Argument`]s and turns a
//! request into a result map. Arguments are parsed in declaration order,
//! which is also the order of errors and of keys in order-preserving maps.
//!
//! | Mode | On failure |
//! |------|------------|
//! | fail-fast (default) | stop at the first failing argument |
//! | `bundle_errors` | parse every argument, report all failures |
//! | `strict` | also reject request keys no argument reads |

use std::fmt;
use std::marker::PhantomData;

use http::StatusCode;
use indexmap::IndexSet;
use reqparse_core::{current, RequestSource};

use crate::config::{ConfigError, ParserConfig};
use crate::error::ParseError;
use crate::location::Location;
use crate::namespace::{Namespace, ResultMap};
use crate::Argument;

/// Per-call parsing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject request keys that no argument reads.
    pub strict: bool,
    /// Status code for argument errors.
    pub http_error_code: StatusCode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            http_error_code: StatusCode::BAD_REQUEST,
        }
    }
}

impl ParseOptions {
    /// Enables or disables strict mode.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the status code for argument errors.
    #[must_use]
    pub fn http_error_code(mut self, status: StatusCode) -> Self {
        self.http_error_code = status;
        self
    }
}

impl TryFrom<&ParserConfig> for ParseOptions {
    type Error = ConfigError;

    /// Takes `strict` and `http_error_code` from `config`.
    ///
    /// Fails with [`ConfigError::InvalidValue`] when the status code is not a
    /// 4xx or 5xx code, which a config built by
    /// [`ConfigLoader::load_unvalidated`](crate::ConfigLoader::load_unvalidated)
    /// can carry.
    fn try_from(config: &ParserConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        let http_error_code = StatusCode::from_u16(config.http_error_code).map_err(|e| {
            ConfigError::invalid_value("http_error_code", e.to_string())
        })?;
        Ok(Self {
            strict: config.strict,
            http_error_code,
        })
    }
}

/// Parses requests against a list of declared arguments.
///
/// `M` is the result map; [`Namespace`] unless chosen otherwise with
/// [`RequestParser::with_result`].
///
/// # Example
///
/// ```rust
/// use reqparse::{ArgType, Argument, RequestParser, Value};
/// use reqparse_core::RequestContext;
///
/// let parser = RequestParser::new()
///     .argument(Argument::new("page").arg_type(ArgType::positive()).default(1))
///     .argument(Argument::new("q").required(true));
///
/// let ctx = RequestContext::builder()
///     .uri("/search?q=rust".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let args = parser.parse_args(&ctx).unwrap();
/// assert_eq!(args["page"], Value::Int(1));
/// assert_eq!(args["q"], Value::from("rust"));
/// ```
pub struct RequestParser<M: ResultMap = Namespace> {
    args: Vec<Argument>,
    trim: bool,
    bundle_errors: bool,
    result: PhantomData<fn() -> M>,
}

impl RequestParser {
    /// Creates a parser producing [`Namespace`]s.
    #[must_use]
    pub fn new() -> Self {
        Self::with_result()
    }
}

impl<M: ResultMap> Default for RequestParser<M> {
    fn default() -> Self {
        Self::with_result()
    }
}

impl<M: ResultMap> Clone for RequestParser<M> {
    fn clone(&self) -> Self {
        Self {
            args: self.args.clone(),
            trim: self.trim,
            bundle_errors: self.bundle_errors,
            result: PhantomData,
        }
    }
}

impl<M: ResultMap> fmt::Debug for RequestParser<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestParser")
            .field("args", &self.args)
            .field("trim", &self.trim)
            .field("bundle_errors", &self.bundle_errors)
            .field("result", &std::any::type_name::<M>())
            .finish()
    }
}

impl<M: ResultMap> RequestParser<M> {
    /// Creates a parser producing `M`.
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use reqparse::{RequestParser, Value};
    ///
    /// let parser = RequestParser::<HashMap<String, Value>>::with_result();
    /// assert!(parser.args().is_empty());
    /// ```
    #[must_use]
    pub fn with_result() -> Self {
        Self {
            args: Vec::new(),
            trim: false,
            bundle_errors: false,
            result: PhantomData,
        }
    }

    /// Creates a parser with `trim` and `bundle_errors` taken from `config`.
    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::with_result()
            .trim(config.trim)
            .bundle_errors(config.bundle_errors)
    }

    /// Strips whitespace from string values of every argument.
    #[must_use]
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Reports every failing argument instead of the first.
    #[must_use]
    pub fn bundle_errors(mut self, bundle_errors: bool) -> Self {
        self.bundle_errors = bundle_errors;
        self
    }

    /// Whether string values are trimmed.
    #[must_use]
    pub fn trims(&self) -> bool {
        self.trim
    }

    /// Whether errors are bundled.
    #[must_use]
    pub fn bundles_errors(&self) -> bool {
        self.bundle_errors
    }

    /// The declared arguments, in order.
    #[must_use]
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Switches the result map, keeping arguments and settings.
    #[must_use]
    pub fn into_result<N: ResultMap>(self) -> RequestParser<N> {
        RequestParser {
            args: self.args,
            trim: self.trim,
            bundle_errors: self.bundle_errors,
            result: PhantomData,
        }
    }

    /// Appends an argument. A bare name declares one with default settings.
    pub fn add_argument(&mut self, argument: impl Into<Argument>) -> &mut Self {
        self.args.push(argument.into());
        self
    }

    /// Appends an argument, consuming and returning the parser.
    #[must_use]
    pub fn argument(mut self, argument: impl Into<Argument>) -> Self {
        self.add_argument(argument);
        self
    }

    /// Removes every argument called `name`, then appends `argument`.
    pub fn replace_argument(&mut self, name: &str, argument: impl Into<Argument>) -> &mut Self {
        self.remove_argument(name);
        self.add_argument(argument)
    }

    /// Rebuilds the argument called `name` from a copy of itself.
    ///
    /// Settings the closure doesn't touch are kept, as is the argument's
    /// position. Does nothing if no argument has that name.
    ///
    /// ```rust
    /// use reqparse::{ArgType, Argument, RequestParser};
    ///
    /// let mut parser = RequestParser::new()
    ///     .argument(Argument::new("foo").arg_type(ArgType::integer()).required(true));
    /// parser.update_argument("foo", |arg| arg.required(false));
    ///
    /// assert!(!parser.args()[0].is_required());
    /// assert_eq!(parser.args()[0].coercer().name(), "integer");
    /// ```
    pub fn update_argument(
        &mut self,
        name: &str,
        update: impl FnOnce(Argument) -> Argument,
    ) -> &mut Self {
        if let Some(index) = self.args.iter().position(|a| a.name() == name) {
            let updated = update(self.args[index].clone());
            self.args[index] = updated;
        }
        self
    }

    /// Removes every argument called `name`.
    pub fn remove_argument(&mut self, name: &str) -> &mut Self {
        self.args.retain(|a| a.name() != name);
        self
    }

    /// Returns an independent parser with the same arguments and settings.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Parses `request` with default options.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if any argument fails.
    pub fn parse_args(&self, request: &dyn RequestSource) -> Result<M, ParseError> {
        self.parse_args_with(Some(request), ParseOptions::default())
    }

    /// Parses `request`, or the current thread's request when `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if any argument fails, strict mode finds
    /// unclaimed keys, or no request is available.
    pub fn parse_args_with(
        &self,
        request: Option<&dyn RequestSource>,
        options: ParseOptions,
    ) -> Result<M, ParseError> {
        match request {
            Some(request) => self.parse_request(request, options),
            None => current::with_current(|active| match active {
                Some(request) => self.parse_request(request, options),
                None => Err(ParseError::NoActiveRequest),
            }),
        }
    }

    fn parse_request(
        &self,
        request: &dyn RequestSource,
        options: ParseOptions,
    ) -> Result<M, ParseError> {
        let mut result = M::default();
        let mut errors = Vec::new();

        for arg in &self.args {
            match arg.parse_trimmed(request, self.trim || arg.trims()) {
                Ok(Some(value)) => result.insert_value(arg.dest_key().to_string(), value),
                Ok(None) => {}
                Err(error) if self.bundle_errors => errors.push(error),
                Err(error) => return Err(ParseError::invalid(error, options.http_error_code)),
            }
        }

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "request arguments failed to parse");
            return Err(ParseError::bundle(errors, options.http_error_code));
        }

        if options.strict {
            let unknown = self.unclaimed_keys(request);
            if !unknown.is_empty() {
                tracing::debug!(names = ?unknown, "rejecting unknown arguments");
                return Err(ParseError::unrecognized(unknown));
            }
        }

        Ok(result)
    }

    /// Keys of the JSON body, query string and form that no argument reads.
    fn unclaimed_keys(&self, request: &dyn RequestSource) -> Vec<String> {
        if self.args.iter().any(|a| a.name() == "*" && a.is_ignored()) {
            return Vec::new();
        }

        let claimed: IndexSet<String> = self.args.iter().flat_map(Argument::lookup_keys).collect();

        let mut unknown: IndexSet<String> = IndexSet::new();
        for location in [Location::Json, Location::Args, Location::Form] {
            if let Some(container) = location.container(request) {
                for key in container.keys() {
                    if !claimed.contains(key) {
                        unknown.insert(key.to_string());
                    }
                }
            }
        }
        unknown.into_iter().collect()
    }
}
