//! `Cookie` header parsing.

use http::{header, HeaderMap};

use crate::MultiDict;

/// Parses every `Cookie` header into a multi-valued container.
///
/// Pairs keep the order they were sent in. Surrounding quotes are removed
/// from values and segments without `=` are skipped.
///
/// # Example
///
/// ```rust
/// use http::{header, HeaderMap, HeaderValue};
/// use reqparse_core::parse_cookies;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_static("session=abc123; theme=\"dark\""));
///
/// let cookies = parse_cookies(&headers);
/// assert_eq!(cookies.get("session").and_then(|v| v.as_str()), Some("abc123"));
/// assert_eq!(cookies.get("theme").and_then(|v| v.as_str()), Some("dark"));
/// ```
#[must_use]
pub fn parse_cookies(headers: &HeaderMap) -> MultiDict {
    let mut cookies = MultiDict::new();

    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else {
            tracing::debug!("skipping non UTF-8 Cookie header");
            continue;
        };
        parse_cookie_header(value, &mut cookies);
    }

    cookies
}

fn parse_cookie_header(header_value: &str, cookies: &mut MultiDict) {
    for cookie in header_value.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            cookies.push(name, value.trim().trim_matches('"'));
        }
    }
}
