//! Parser configuration.
//!
//! [`ParserConfig`] holds the switches that are usually set per
//! application rather than per parser. [`ConfigLoader`] builds one in
//! layers, later layers overriding earlier ones:
//!
//! 1. Defaults
//! 2. A TOML or JSON file
//! 3. Environment variables `PREFIX__TRIM`, `PREFIX__BUNDLE_ERRORS`,
//!    `PREFIX__STRICT` and `PREFIX__HTTP_ERROR_CODE`
//!
//! ```toml
//! trim = true
//! bundle_errors = true
//! strict = false
//! http_error_code = 422
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a [`ParserConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// The field with the invalid value.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// Unsupported format or failed validation.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a validation error.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

/// Application-wide parser settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Strip whitespace from string values for every argument.
    pub trim: bool,
    /// Report every failing argument instead of the first.
    pub bundle_errors: bool,
    /// Reject request keys no argument claims.
    pub strict: bool,
    /// Status code for argument errors.
    pub http_error_code: u16,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            trim: false,
            bundle_errors: false,
            strict: false,
            http_error_code: 400,
        }
    }
}

impl ParserConfig {
    /// Checks that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `http_error_code` is not a
    /// 4xx or 5xx status.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(400..600).contains(&self.http_error_code) {
            return Err(ConfigError::invalid_value(
                "http_error_code",
                format!("{} is not a 4xx or 5xx status", self.http_error_code),
            ));
        }
        Ok(())
    }
}

/// Layered loader for [`ParserConfig`].
///
/// # Example
///
/// ```no_run
/// use reqparse::ConfigLoader;
///
/// # fn main() -> Result<(), reqparse::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("reqparse.toml")?
///     .with_env_prefix("REQPARSE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ParserConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a loader holding the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = ParserConfig::default();
        self
    }

    /// Load a `.toml` or `.json` file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, or fails to parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.config = Self::parse_file(&content, path)?;
        tracing::debug!(path = %path.display(), "loaded parser configuration");

        Ok(self)
    }

    /// Load a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format
    /// (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unsupported or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use reqparse::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("bundle_errors = true", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.bundle_errors);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Read overrides from `PREFIX__KEY` environment variables at load time.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable fails to parse or
    /// the result is invalid.
    pub fn load(mut self) -> Result<ParserConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or
    /// validation.
    #[must_use]
    pub fn load_unvalidated(self) -> ParserConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<ParserConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(prefix)).collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(name) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };

        match name {
            "TRIM" => {
                self.config.trim = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            "BUNDLE_ERRORS" => {
                self.config.bundle_errors = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            "STRICT" => {
                self.config.strict = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            "HTTP_ERROR_CODE" => {
                self.config.http_error_code = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            other => {
                tracing::trace!(var = %key, name = other, "ignoring unknown variable");
            }
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, ParserConfig::default());
        assert!(!config.trim);
        assert!(!config.bundle_errors);
        assert!(!config.strict);
        assert_eq!(config.http_error_code, 400);
    }

    #[test]
    fn test_with_string_toml() {
        let toml = r"
            trim = true
            bundle_errors = true
            http_error_code = 422
        ";
        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();
        assert!(config.trim);
        assert!(config.bundle_errors);
        assert!(!config.strict);
        assert_eq!(config.http_error_code, 422);
    }

    #[test]
    fn test_with_string_json() {
        let config = ConfigLoader::new()
            .with_string(r#"{"strict": true}"#, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(config.strict);
        assert_eq!(config.http_error_code, 400);
    }

    #[test]
    fn test_with_string_unknown_format() {
        let result = ConfigLoader::new().with_string("trim: true", "yaml");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::new().with_string("verbose = true", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reqparse.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "bundle_errors = true").unwrap();

        let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
        assert!(config.bundle_errors);
    }

    #[test]
    fn test_with_file_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reqparse.json");
        fs::write(&path, r#"{"http_error_code": 409}"#).unwrap();

        let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
        assert_eq!(config.http_error_code, 409);
    }

    #[test]
    fn test_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/reqparse.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_with_file_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reqparse.ini");
        fs::write(&path, "trim=1").unwrap();

        let result = ConfigLoader::new().with_file(&path);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_with_optional_file_missing() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/reqparse.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_validate_status_code() {
        let result = ConfigLoader::new()
            .with_string("http_error_code = 200", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let config = ConfigLoader::new()
            .with_string("http_error_code = 200", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.http_error_code, 200);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_apply_env_var() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__TRIM", "yes", "TEST").unwrap();
        loader.apply_env_var("TEST__BUNDLE_ERRORS", "true", "TEST").unwrap();
        loader.apply_env_var("TEST__STRICT", "1", "TEST").unwrap();
        loader.apply_env_var("TEST__HTTP_ERROR_CODE", "422", "TEST").unwrap();

        assert!(loader.config.trim);
        assert!(loader.config.bundle_errors);
        assert!(loader.config.strict);
        assert_eq!(loader.config.http_error_code, 422);
    }

    #[test]
    fn test_apply_env_var_invalid() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("TEST__STRICT", "sometimes", "TEST");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));

        let result = loader.apply_env_var("TEST__HTTP_ERROR_CODE", "bad", "TEST");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
    }

    #[test]
    fn test_apply_env_var_ignores_unknown() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__VERBOSE", "true", "TEST").unwrap();
        loader.apply_env_var("TESTING", "true", "TEST").unwrap();
        assert_eq!(loader.config, ParserConfig::default());
    }
}
