//! Request sources.
//!
//! A [`RequestSource`] exposes each location of an HTTP request as a
//! [`MultiDict`]. [`RequestContext`] is the standard implementation, built
//! from `http` request parts; tests and other frameworks can implement the
//! trait directly.

use std::borrow::Cow;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};

use crate::files::{read_multipart, MultipartConfig};
use crate::{parse_cookies, MultiDict, RequestError, RequestResult, UploadedFile, Value};

/// Default maximum size of a JSON or urlencoded body (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Access to the locations of a request.
///
/// Every method returns `None` when the request has no such location; an
/// argument looking there simply finds nothing. The default
/// [`values`](RequestSource::values) combines the query string and the form
/// body, query entries first.
pub trait RequestSource {
    /// Query string parameters.
    fn args(&self) -> Option<Cow<'_, MultiDict>> {
        None
    }

    /// Form body fields.
    fn form(&self) -> Option<Cow<'_, MultiDict>> {
        None
    }

    /// Query string and form fields together.
    fn values(&self) -> Option<Cow<'_, MultiDict>> {
        match (self.args(), self.form()) {
            (None, None) => None,
            (Some(only), None) | (None, Some(only)) => Some(only),
            (Some(args), Some(form)) => {
                let mut merged = args.into_owned();
                merged.extend_from(&form);
                Some(Cow::Owned(merged))
            }
        }
    }

    /// Top-level members of a JSON object body.
    fn json(&self) -> Option<Cow<'_, MultiDict>> {
        None
    }

    /// Request headers, with case-insensitive keys.
    fn headers(&self) -> Option<Cow<'_, MultiDict>> {
        None
    }

    /// Request cookies.
    fn cookies(&self) -> Option<Cow<'_, MultiDict>> {
        None
    }

    /// Parameters captured from the URL path by a router.
    fn view_args(&self) -> Option<Cow<'_, MultiDict>> {
        None
    }

    /// Uploaded files, as [`Value::File`].
    fn files(&self) -> Option<Cow<'_, MultiDict>> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Multipart,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let Some(mime) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
    else {
        return BodyKind::Other;
    };

    if mime.type_() == mime::APPLICATION {
        if mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON) {
            return BodyKind::Json;
        }
        if mime.subtype() == mime::WWW_FORM_URLENCODED {
            return BodyKind::Form;
        }
    }
    if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
        return BodyKind::Multipart;
    }
    BodyKind::Other
}

fn decode_pairs(part: &'static str, input: &[u8]) -> RequestResult<MultiDict> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)
        .map_err(|e| RequestError::malformed(part, e.to_string()))?;
    Ok(pairs.into_iter().collect())
}

fn header_fields(headers: &HeaderMap) -> MultiDict {
    let mut fields = MultiDict::case_insensitive();
    for (name, value) in headers {
        fields.push(
            name.as_str(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    fields
}

fn check_size(max: usize, body: &Bytes) -> RequestResult<()> {
    if body.len() > max {
        return Err(RequestError::payload_too_large(max, body.len()));
    }
    Ok(())
}

/// A decoded HTTP request.
///
/// Decoding happens once, at construction: the query string, a JSON or
/// urlencoded body, cookies and headers are each turned into a
/// [`MultiDict`]. Multipart bodies need an async read; see
/// [`RequestContextBuilder::build_multipart`].
///
/// # Example
///
/// ```rust
/// use reqparse_core::{RequestContext, RequestSource, Value};
///
/// let ctx = RequestContext::builder()
///     .uri("/search?q=rust&page=2".parse().unwrap())
///     .json(&serde_json::json!({"tags": ["a", "b"]}))
///     .view_arg("team", "core")
///     .build()
///     .unwrap();
///
/// assert_eq!(ctx.args().unwrap().get("page"), Some(&Value::from("2")));
/// assert!(ctx.json().unwrap().contains_key("tags"));
/// assert_eq!(ctx.view_args().unwrap().get("team"), Some(&Value::from("core")));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    header_map: HeaderMap,
    body: Bytes,
    json_body: Option<serde_json::Value>,
    args: MultiDict,
    form: MultiDict,
    json_fields: Option<MultiDict>,
    headers: MultiDict,
    cookies: MultiDict,
    view_args: MultiDict,
    files: MultiDict,
}

impl RequestContext {
    /// Decodes a request from its parts using the default body limit.
    ///
    /// # Errors
    ///
    /// Fails if the query string or a JSON/urlencoded body is malformed, or
    /// the body exceeds [`DEFAULT_MAX_BODY_SIZE`].
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        view_args: MultiDict,
    ) -> RequestResult<Self> {
        Self::decode(method, uri, headers, body, view_args, DEFAULT_MAX_BODY_SIZE)
    }

    /// Decodes an `http::Request` whose body has already been collected.
    ///
    /// # Errors
    ///
    /// Same as [`RequestContext::new`].
    pub fn from_http(request: http::Request<Bytes>, view_args: MultiDict) -> RequestResult<Self> {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body, view_args)
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::new()
    }

    fn decode(
        method: Method,
        uri: Uri,
        header_map: HeaderMap,
        body: Bytes,
        view_args: MultiDict,
        max_body_size: usize,
    ) -> RequestResult<Self> {
        let args = match uri.query() {
            Some(query) => decode_pairs("query string", query.as_bytes())?,
            None => MultiDict::new(),
        };

        let mut form = MultiDict::new();
        let mut json_body = None;
        let mut json_fields = None;

        match body_kind(&header_map) {
            BodyKind::Json if !body.is_empty() => {
                check_size(max_body_size, &body)?;
                let value: serde_json::Value = serde_json::from_slice(&body)
                    .map_err(|e| RequestError::malformed("JSON body", e.to_string()))?;
                let fields = match &value {
                    serde_json::Value::Object(map) => map
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                        .collect(),
                    _ => MultiDict::new(),
                };
                json_fields = Some(fields);
                json_body = Some(value);
            }
            BodyKind::Form => {
                check_size(max_body_size, &body)?;
                form = decode_pairs("form body", &body)?;
            }
            _ => {}
        }

        let headers = header_fields(&header_map);
        let cookies = parse_cookies(&header_map);

        tracing::debug!(
            method = %method,
            path = %uri.path(),
            query_fields = args.len(),
            form_fields = form.len(),
            json = json_body.is_some(),
            "decoded request"
        );

        Ok(Self {
            method,
            uri,
            header_map,
            body,
            json_body,
            args,
            form,
            json_fields,
            headers,
            cookies,
            view_args,
            files: MultiDict::new(),
        })
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the raw query string, if any.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the raw request headers.
    #[must_use]
    pub fn header_map(&self) -> &HeaderMap {
        &self.header_map
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the decoded JSON body, if the request carried one.
    #[must_use]
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        self.json_body.as_ref()
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_map
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

impl RequestSource for RequestContext {
    fn args(&self) -> Option<Cow<'_, MultiDict>> {
        Some(Cow::Borrowed(&self.args))
    }

    fn form(&self) -> Option<Cow<'_, MultiDict>> {
        Some(Cow::Borrowed(&self.form))
    }

    fn json(&self) -> Option<Cow<'_, MultiDict>> {
        self.json_fields.as_ref().map(Cow::Borrowed)
    }

    fn headers(&self) -> Option<Cow<'_, MultiDict>> {
        Some(Cow::Borrowed(&self.headers))
    }

    fn cookies(&self) -> Option<Cow<'_, MultiDict>> {
        Some(Cow::Borrowed(&self.cookies))
    }

    fn view_args(&self) -> Option<Cow<'_, MultiDict>> {
        Some(Cow::Borrowed(&self.view_args))
    }

    fn files(&self) -> Option<Cow<'_, MultiDict>> {
        Some(Cow::Borrowed(&self.files))
    }
}

impl TryFrom<http::Request<Bytes>> for RequestContext {
    type Error = RequestError;

    fn try_from(request: http::Request<Bytes>) -> RequestResult<Self> {
        Self::from_http(request, MultiDict::new())
    }
}

/// Builder for constructing a [`RequestContext`].
///
/// Useful in tests and when adapting other frameworks.
#[derive(Debug, Default)]
pub struct RequestContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    view_args: MultiDict,
    form_fields: MultiDict,
    files: MultiDict,
    max_body_size: Option<usize>,
}

impl RequestContextBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the request URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Sets all headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and its content type.
    #[must_use]
    pub fn json(mut self, value: &serde_json::Value) -> Self {
        self.body = Bytes::from(value.to_string());
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self
    }

    /// Adds a form field, after any decoded from the body.
    #[must_use]
    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.form_fields.push(name, value);
        self
    }

    /// Adds a URL path parameter.
    #[must_use]
    pub fn view_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.view_args.push(name, value);
        self
    }

    /// Adds an uploaded file.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.files.push(name, Value::File(file));
        self
    }

    /// Sets the body limit for JSON and urlencoded bodies.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = Some(size);
        self
    }

    /// Builds the context, decoding the query string and body.
    ///
    /// A multipart body is left undecoded; use
    /// [`build_multipart`](Self::build_multipart) for those.
    ///
    /// # Errors
    ///
    /// Fails if the query string or body is malformed or too large.
    pub fn build(self) -> RequestResult<RequestContext> {
        let mut ctx = RequestContext::decode(
            self.method.unwrap_or(Method::GET),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
            self.view_args,
            self.max_body_size.unwrap_or(DEFAULT_MAX_BODY_SIZE),
        )?;
        ctx.form.extend_from(&self.form_fields);
        ctx.files.extend_from(&self.files);
        Ok(ctx)
    }

    /// Builds the context, also decoding a `multipart/form-data` body into
    /// form fields and files.
    ///
    /// # Errors
    ///
    /// Fails like [`build`](Self::build), or if the multipart body is
    /// malformed or exceeds the limits in `config`.
    pub async fn build_multipart(self, config: &MultipartConfig) -> RequestResult<RequestContext> {
        let multipart = body_kind(&self.headers) == BodyKind::Multipart;
        let headers = self.headers.clone();
        let body = self.body.clone();
        let mut ctx = self.build()?;

        if multipart {
            let parts = read_multipart(&headers, body, config).await?;
            let mut form = parts.form;
            form.extend_from(&ctx.form);
            ctx.form = form;
            ctx.files.extend_from(&parts.files);
        }
        Ok(ctx)
    }
}
