//! Argument declarations.
//!
//! An [`Argument`] describes one expected input: where to look for it, how
//! to coerce it, which values are allowed and what to store when it is
//! missing. Arguments are immutable once built and hold no per-request
//! state, so one declaration can serve any number of concurrent requests.
//!
//! # Lookup keys and operators
//!
//! Each operator adds a lookup key: the argument name followed by the
//! operator with its first `=` removed.
//!
//! | Operator | Key for `age` |
//! |----------|---------------|
//! | `=` | `age` |
//! | `>=` | `age>` |
//! | `<=` | `age<` |
//! | `!=` | `age!` |
//!
//! A query string `age>=18` decodes to key `age>` and value `18`, so the
//! `>=` operator finds it.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use reqparse_core::{Comparison, MultiDict, RequestSource, Value};

use crate::error::{ArgumentError, ArgumentErrorKind};
use crate::location::{Location, DEFAULT_LOCATIONS};
use crate::ArgType;

/// What to do with the values found for an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Coerce and keep the first value found.
    #[default]
    Store,
    /// Coerce and keep every value found, as a list.
    Append,
    /// Keep every value found, uncoerced, tagged with its operator.
    Filter,
}

/// The values an argument accepts after coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Choices {
    /// Anything.
    #[default]
    Any,
    /// One of these values.
    Values(Vec<Value>),
    /// An integer in `start..end` (end exclusive).
    Range(Range<i64>),
}

impl Choices {
    /// Returns `true` if no constraint applies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Any => true,
            Self::Values(values) => values.is_empty(),
            Self::Range(_) => false,
        }
    }

    /// Checks membership, lowercasing string choices when
    /// `case_sensitive` is false.
    #[must_use]
    pub fn contains(&self, value: &Value, case_sensitive: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Values(values) if values.is_empty() => true,
            Self::Values(values) => values.iter().any(|choice| {
                if case_sensitive {
                    choice == value
                } else {
                    &choice.to_lowercase() == value
                }
            }),
            Self::Range(range) => value.as_i64().is_some_and(|n| range.contains(&n)),
        }
    }

    fn violation(&self, value: &Value) -> String {
        match self {
            Self::Range(range) => format!(
                "{value} is not a valid choice (expected a value in {}..{})",
                range.start, range.end
            ),
            _ => format!("{value} is not a valid choice"),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Choices {
    fn from(values: Vec<T>) -> Self {
        Self::Values(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Choices {
    fn from(values: [T; N]) -> Self {
        Self::Values(values.into_iter().map(Into::into).collect())
    }
}

impl From<Range<i64>> for Choices {
    fn from(range: Range<i64>) -> Self {
        Self::Range(range)
    }
}

/// The value stored for a missing argument.
#[derive(Clone, Default)]
pub enum DefaultValue {
    /// Store null.
    #[default]
    Null,
    /// Store this value.
    Static(Value),
    /// Store the result of calling this factory.
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Produces the value to store.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Static(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// A declared request argument.
///
/// # Example
///
/// ```rust
/// use reqparse::{Action, ArgType, Argument, Location};
/// use reqparse_core::{RequestContext, Value};
///
/// let arg = Argument::new("tag")
///     .location(Location::Args)
///     .action(Action::Append)
///     .choices(["red", "green"]);
///
/// let ctx = RequestContext::builder()
///     .uri("/?tag=red&tag=green".parse().unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(arg.parse(&ctx).unwrap(), Some(Value::from(vec!["red", "green"])));
/// ```
#[derive(Debug, Clone)]
pub struct Argument {
    name: String,
    dest: Option<String>,
    locations: Vec<Location>,
    arg_type: ArgType,
    default: DefaultValue,
    action: Action,
    choices: Choices,
    case_sensitive: bool,
    help: Option<String>,
    required: bool,
    ignore: bool,
    store_missing: bool,
    operators: Vec<String>,
    trim: bool,
    nullable: bool,
}

impl Argument {
    /// Declares an argument with default settings.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "argument name must not be empty");
        Self {
            name,
            dest: None,
            locations: DEFAULT_LOCATIONS.to_vec(),
            arg_type: ArgType::default(),
            default: DefaultValue::Null,
            action: Action::Store,
            choices: Choices::Any,
            case_sensitive: true,
            help: None,
            required: false,
            ignore: false,
            store_missing: true,
            operators: vec!["=".to_string()],
            trim: false,
            nullable: true,
        }
    }

    /// Stores the result under `dest` instead of the name.
    #[must_use]
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Reads from a single location.
    #[must_use]
    pub fn location(mut self, location: Location) -> Self {
        self.locations = vec![location];
        self
    }

    /// Reads from several locations, earlier ones taking precedence.
    ///
    /// An empty list restores the default locations.
    #[must_use]
    pub fn locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations = locations.into_iter().collect();
        if self.locations.is_empty() {
            self.locations = DEFAULT_LOCATIONS.to_vec();
        }
        self
    }

    /// Sets the type coercer.
    #[must_use]
    pub fn arg_type(mut self, arg_type: impl Into<ArgType>) -> Self {
        self.arg_type = arg_type.into();
        self
    }

    /// Sets a static default.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Static(value.into());
        self
    }

    /// Sets a default computed each time the argument is missing.
    #[must_use]
    pub fn default_with(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = DefaultValue::Factory(Arc::new(factory));
        self
    }

    /// Sets the action.
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Restricts the accepted values.
    #[must_use]
    pub fn choices(mut self, choices: impl Into<Choices>) -> Self {
        self.choices = choices.into();
        self
    }

    /// When `false`, string values and choices are compared and stored
    /// lowercased.
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Replaces error messages. `{error_msg}` is substituted with the
    /// underlying message.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Fails when the argument is found nowhere.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Never reads the request; the argument is always missing.
    #[must_use]
    pub fn ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    /// When `false`, a missing argument is left out of the result.
    #[must_use]
    pub fn store_missing(mut self, store_missing: bool) -> Self {
        self.store_missing = store_missing;
        self
    }

    /// Sets the comparison operators, searched in order.
    ///
    /// An empty list restores the default `["="]`.
    #[must_use]
    pub fn operators<I, S>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operators = operators.into_iter().map(Into::into).collect();
        if self.operators.is_empty() {
            self.operators = vec!["=".to_string()];
        }
        self
    }

    /// Strips surrounding whitespace from string values before coercion.
    #[must_use]
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// When `false`, an explicit null fails.
    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// The argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The result key: `dest` if set, else the name.
    #[must_use]
    pub fn dest_key(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.name)
    }

    /// The locations searched, in order.
    #[must_use]
    pub fn location_list(&self) -> &[Location] {
        &self.locations
    }

    /// The type coercer.
    #[must_use]
    pub fn coercer(&self) -> &ArgType {
        &self.arg_type
    }

    /// The default for a missing argument.
    #[must_use]
    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    /// The action.
    #[must_use]
    pub fn action_kind(&self) -> Action {
        self.action
    }

    /// The accepted values.
    #[must_use]
    pub fn choice_set(&self) -> &Choices {
        &self.choices
    }

    /// Whether comparisons are case sensitive.
    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The help text.
    #[must_use]
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Whether the argument is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the argument is ignored.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    /// Whether a missing argument is stored.
    #[must_use]
    pub fn stores_missing(&self) -> bool {
        self.store_missing
    }

    /// The comparison operators.
    #[must_use]
    pub fn operator_list(&self) -> &[String] {
        &self.operators
    }

    /// Whether string values are trimmed.
    #[must_use]
    pub fn trims(&self) -> bool {
        self.trim
    }

    /// Whether explicit nulls are accepted.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The request keys this argument reads, one per operator.
    #[must_use]
    pub fn lookup_keys(&self) -> Vec<String> {
        self.operators
            .iter()
            .map(|op| format!("{}{}", self.name, op.replacen('=', "", 1)))
            .collect()
    }

    fn containers<'r>(&self, request: &'r dyn RequestSource) -> Vec<Cow<'r, MultiDict>> {
        self.locations
            .iter()
            .filter_map(|location| location.container(request))
            .collect()
    }

    /// Merges the containers of every declared location, in order.
    ///
    /// Locations the request doesn't provide contribute nothing.
    #[must_use]
    pub fn source<'r>(&self, request: &'r dyn RequestSource) -> Cow<'r, MultiDict> {
        let mut containers = self.containers(request);
        if containers.len() == 1 {
            return containers.remove(0);
        }
        let mut merged = MultiDict::new();
        for container in &containers {
            merged.extend_from(container);
        }
        Cow::Owned(merged)
    }

    /// Parses this argument from `request`.
    ///
    /// Returns `Ok(Some(value))` to store, or `Ok(None)` when the argument is
    /// missing and `store_missing` is off.
    ///
    /// # Errors
    ///
    /// Returns an [`ArgumentError`] if the argument is required but missing,
    /// a value fails coercion, is not an allowed choice, or is a
    /// disallowed null.
    pub fn parse(&self, request: &dyn RequestSource) -> Result<Option<Value>, ArgumentError> {
        self.parse_trimmed(request, self.trim)
    }

    /// Parses with `trim` overriding the argument's own setting.
    pub(crate) fn parse_trimmed(
        &self,
        request: &dyn RequestSource,
        trim: bool,
    ) -> Result<Option<Value>, ArgumentError> {
        let found = if self.ignore {
            None
        } else {
            self.find(request, trim)?
        };

        match found {
            Some(value) => Ok(Some(value)),
            None if self.store_missing => Ok(Some(self.default.resolve())),
            None => Ok(None),
        }
    }

    fn find(
        &self,
        request: &dyn RequestSource,
        trim: bool,
    ) -> Result<Option<Value>, ArgumentError> {
        let containers = self.containers(request);

        let mut matches: Vec<(&str, Vec<Value>)> = Vec::new();
        for (operator, key) in self.operators.iter().zip(self.lookup_keys()) {
            let mut values: Vec<Value> = containers
                .iter()
                .flat_map(|c| c.get_all(&key).cloned().collect::<Vec<_>>())
                .collect();
            if values.is_empty() {
                continue;
            }
            if self.action == Action::Append && values.len() == 1 {
                if let Value::List(items) = &values[0] {
                    values = items.clone();
                }
            }
            if trim {
                values = values.iter().map(Value::trimmed).collect();
            }
            tracing::trace!(argument = %self.name, key = %key, count = values.len(), "matched");
            matches.push((operator.as_str(), values));
        }

        if matches.is_empty() {
            if self.required {
                let detail = ArgumentError::missing_message(&self.name, &self.locations);
                return Err(self.error(ArgumentErrorKind::MissingRequired, detail));
            }
            return Ok(None);
        }

        let value = match self.action {
            Action::Filter => Value::Comparisons(
                matches
                    .into_iter()
                    .flat_map(|(op, values)| {
                        values.into_iter().map(move |v| Comparison::new(op, v))
                    })
                    .collect(),
            ),
            Action::Append => {
                let mut items = Vec::new();
                for (op, values) in matches {
                    for raw in values {
                        items.push(self.convert(&raw, op)?);
                    }
                }
                Value::List(items)
            }
            Action::Store => {
                let (op, values) = &matches[0];
                match values.first() {
                    Some(raw) => self.convert(raw, op)?,
                    None => return Ok(None),
                }
            }
        };
        Ok(Some(value))
    }

    fn convert(&self, raw: &Value, operator: &str) -> Result<Value, ArgumentError> {
        if raw.is_null() {
            if self.nullable {
                return Ok(Value::Null);
            }
            return Err(self.error(ArgumentErrorKind::Null, "Must not be null!".to_string()));
        }

        let value = self
            .arg_type
            .coerce(raw, &self.name, operator)
            .map_err(|message| {
                let text = match &self.help {
                    Some(help) => help.replace("{error_msg}", &message),
                    None => format!("{}: {message}", self.name),
                };
                self.failure(ArgumentErrorKind::TypeCoercion, text)
            })?;

        let value = if self.case_sensitive {
            value
        } else {
            value.to_lowercase()
        };

        if !value.is_null() && !self.choices.contains(&value, self.case_sensitive) {
            let detail = self.choices.violation(&value);
            return Err(self.error(ArgumentErrorKind::InvalidChoice, detail));
        }
        Ok(value)
    }

    /// Builds an error, applying `help` to `detail`.
    fn error(&self, kind: ArgumentErrorKind, detail: String) -> ArgumentError {
        let message = match &self.help {
            Some(help) => help.replace("{error_msg}", &detail),
            None => detail,
        };
        self.failure(kind, message)
    }

    fn failure(&self, kind: ArgumentErrorKind, message: String) -> ArgumentError {
        tracing::debug!(argument = %self.name, kind = kind.as_str(), "argument rejected");
        ArgumentError::new(self.name.clone(), kind, message)
    }
}

impl From<&str> for Argument {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Argument {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
