//! Absolute URL validation.

use regex::Regex;
use std::sync::OnceLock;

use crate::{InputError, InputResult};

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"^(?i:(?:http|ftp)s?)://",
            // user:pass authentication
            r"(?:[^:@]+?:[^:@]*?@|)",
            r"(?:",
            // domain
            r"(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+(?:[A-Za-z]{2,6}\.?|[A-Za-z0-9-]{2,}\.?)",
            r"|(?i:localhost)",
            // ipv4
            r"|[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}",
            // ipv6
            r"|\[?[A-Fa-f0-9]*:[A-Fa-f0-9:]+\]?",
            r")",
            r"(?::[0-9]+)?",
            r"(?:/?|[/?]\S+)$",
        ))
        .expect("valid URL regex")
    })
}

/// Returns `true` if `value` is an absolute URL.
#[must_use]
pub fn is_valid_url(value: &str) -> bool {
    url_regex().is_match(value)
}

/// Validates an absolute URL and returns it unchanged.
///
/// When the value is only missing its scheme, the error message suggests the
/// `http://` form.
///
/// # Example
///
/// ```
/// use reqparse_inputs::url;
///
/// assert_eq!(url("http://example.com/").unwrap(), "http://example.com/");
///
/// let err = url("google.com").unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "google.com is not a valid URL. Did you mean: http://google.com"
/// );
/// ```
pub fn url(value: &str) -> InputResult<String> {
    if is_valid_url(value) {
        return Ok(value.to_string());
    }

    let candidate = format!("http://{value}");
    let suggestion = is_valid_url(&candidate).then_some(candidate);
    Err(InputError::invalid_url(value, suggestion))
}
