//! Uploaded files and `multipart/form-data` decoding.
//!
//! Multipart bodies are split into text fields, which join the request's
//! form values, and file parts, which become [`UploadedFile`]s in the
//! request's file container.

use bytes::Bytes;
use http::{header, HeaderMap};
use std::io;

use crate::{MultiDict, RequestError, RequestResult, Value};

/// Default maximum total body size for multipart (50 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum size per field (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Configuration for multipart decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartConfig {
    /// Maximum total body size in bytes.
    pub max_body_size: usize,
    /// Maximum size per field in bytes.
    pub max_field_size: usize,
    /// Maximum number of fields allowed.
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: 100,
        }
    }
}

impl MultipartConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the maximum field size.
    #[must_use]
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Set the maximum number of fields.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

/// A file uploaded with a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// The form field name.
    pub name: Option<String>,
    /// The original file name from the client.
    pub file_name: Option<String>,
    /// The MIME type of the file.
    pub content_type: Option<String>,
    /// The file content.
    pub data: Bytes,
}

impl UploadedFile {
    /// Create a new uploaded file.
    #[must_use]
    pub fn new(
        name: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Self {
        Self {
            name,
            file_name,
            content_type,
            data,
        }
    }

    /// Get the form field name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the original file name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Get the MIME type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Get the file data.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Get the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the file extension from the file name.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .as_ref()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
    }
}

/// Text fields and files decoded from a multipart body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartParts {
    /// Fields without a file name, as text.
    pub form: MultiDict,
    /// Fields with a file name, as [`Value::File`].
    pub files: MultiDict,
}

/// Decodes a `multipart/form-data` body.
///
/// Parts carrying a `filename` go to [`MultipartParts::files`]; all other
/// parts must be UTF-8 text and go to [`MultipartParts::form`].
///
/// # Errors
///
/// Fails if the content type has no boundary, a limit in `config` is
/// exceeded, or a text part is not UTF-8.
pub async fn read_multipart(
    headers: &HeaderMap,
    body: Bytes,
    config: &MultipartConfig,
) -> RequestResult<MultipartParts> {
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let Some(content_type) = content_type else {
        return Err(RequestError::unsupported_media_type(
            "multipart/form-data",
            None,
        ));
    };

    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        RequestError::malformed(
            "multipart body",
            "missing or invalid boundary in multipart Content-Type",
        )
    })?;

    if body.len() > config.max_body_size {
        return Err(RequestError::payload_too_large(
            config.max_body_size,
            body.len(),
        ));
    }

    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut parts = MultipartParts::default();
    let mut field_count = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RequestError::malformed("multipart body", e.to_string()))?
    {
        field_count += 1;
        if field_count > config.max_fields {
            return Err(RequestError::malformed(
                "multipart body",
                format!("too many fields (max: {})", config.max_fields),
            ));
        }

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| RequestError::malformed("multipart body", e.to_string()))?;

        if data.len() > config.max_field_size {
            return Err(RequestError::payload_too_large(
                config.max_field_size,
                data.len(),
            ));
        }

        if file_name.is_some() {
            tracing::debug!(field = %name, size = data.len(), "received uploaded file");
            let file = UploadedFile::new(Some(name.clone()), file_name, content_type, data);
            parts.files.push(name, Value::File(file));
        } else {
            let text = String::from_utf8(data.to_vec())
                .map_err(|_| RequestError::InvalidUtf8("multipart text field"))?;
            parts.form.push(name, text);
        }
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    const BOUNDARY: &str = "X-BOUNDARY";

    fn create_multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Bytes {
        let mut body = Vec::new();

        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());

            if let Some(fname) = filename {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{fname}\"\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: text/plain\r\n");
            } else {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
                );
            }

            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Bytes::from(body)
    }

    fn multipart_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_uploaded_file_accessors() {
        let file = UploadedFile::new(
            Some("doc".into()),
            Some("report.final.pdf".into()),
            Some("application/pdf".into()),
            Bytes::from_static(b"%PDF"),
        );
        assert_eq!(file.name(), Some("doc"));
        assert_eq!(file.file_name(), Some("report.final.pdf"));
        assert_eq!(file.content_type(), Some("application/pdf"));
        assert_eq!(file.extension(), Some("pdf"));
        assert_eq!(file.len(), 4);
        assert!(!file.is_empty());
    }

    #[test]
    fn test_multipart_config_builder() {
        let config = MultipartConfig::new()
            .max_body_size(1024)
            .max_field_size(512)
            .max_fields(3);
        assert_eq!(config.max_body_size, 1024);
        assert_eq!(config.max_field_size, 512);
        assert_eq!(config.max_fields, 3);
    }

    #[tokio::test]
    async fn test_read_multipart_splits_text_and_files() {
        let body = create_multipart_body(&[
            ("title", None, b"holiday"),
            ("photo", Some("beach.jpg"), b"\xff\xd8\xff"),
            ("title", None, b"summer"),
        ]);

        let parts = read_multipart(&multipart_headers(), body, &MultipartConfig::default())
            .await
            .unwrap();

        let titles: Vec<_> = parts.form.get_all("title").collect();
        assert_eq!(titles, vec![&Value::from("holiday"), &Value::from("summer")]);

        let photo = parts.files.get("photo").and_then(Value::as_file).unwrap();
        assert_eq!(photo.file_name(), Some("beach.jpg"));
        assert_eq!(photo.content_type(), Some("text/plain"));
        assert_eq!(photo.data().as_ref(), b"\xff\xd8\xff");
    }

    #[tokio::test]
    async fn test_read_multipart_missing_content_type() {
        let err = read_multipart(&HeaderMap::new(), Bytes::new(), &MultipartConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedMediaType { .. }));
    }

    #[tokio::test]
    async fn test_read_multipart_body_too_large() {
        let body = create_multipart_body(&[("a", None, b"0123456789")]);
        let config = MultipartConfig::new().max_body_size(10);
        let err = read_multipart(&multipart_headers(), body, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::PayloadTooLarge { max: 10, .. }));
    }

    #[tokio::test]
    async fn test_read_multipart_too_many_fields() {
        let body = create_multipart_body(&[("a", None, b"1"), ("b", None, b"2")]);
        let config = MultipartConfig::new().max_fields(1);
        let err = read_multipart(&multipart_headers(), body, &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too many fields"));
    }

    #[tokio::test]
    async fn test_read_multipart_invalid_utf8_text() {
        let body = create_multipart_body(&[("a", None, b"\xff\xfe")]);
        let err = read_multipart(&multipart_headers(), body, &MultipartConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidUtf8(_)));
    }
}
