//! Layered loading of [`HestiaConfig`].
//!
//! Presets, then files or strings, then `.env`, then `HESTIA__*` variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, HestiaConfig, LogFormat};

/// Builds a [`HestiaConfig`] one layer at a time.
///
/// Layers are applied in call order. File and string layers are merged key
/// by key, so a file that only sets `server.http_addr` keeps every other
/// value from the layers below it. Environment overrides are applied last,
/// in [`load`](Self::load).
///
/// # Example
///
/// ```no_run
/// use hestia_config::ConfigLoader;
///
/// # fn main() -> Result<(), hestia_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_development()
///     .with_file("hestia.toml")?
///     .with_env_prefix("HESTIA")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HestiaConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HestiaConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HestiaConfig::default();
        self
    }

    /// Reset to the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use hestia_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HestiaConfig::development();
        self
    }

    /// Reset to the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HestiaConfig::production();
        self
    }

    /// Merge configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats, chosen by extension.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or unreadable, has an unknown
    /// extension, does not parse, or names a field the schema lacks.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some(format @ ("toml" | "json")) => self.with_string(&content, format),
            _ => Err(ConfigError::unsupported_format(path.display().to_string())),
        }
    }

    /// Merge configuration from a file if it exists.
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

    /// Merge configuration from a string.
    ///
    /// # Arguments
    ///
    /// * `content` - Configuration content
    /// * `format` - `"toml"` or `"json"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or unknown fields are present.
    ///
    /// # Example
    ///
    /// ```
    /// use hestia_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nhttp_addr = \"127.0.0.1:3000\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// assert_eq!(config.server.shutdown_timeout_secs, 30);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer = match format.to_lowercase().as_str() {
            "toml" => {
                // Typed parse first so unknown fields surface with TOML positions.
                toml::from_str::<HestiaConfig>(content)?;
                serde_json::to_value(toml::from_str::<toml::Table>(content)?)?
            }
            "json" => {
                serde_json::from_str::<HestiaConfig>(content)?;
                serde_json::from_str::<Value>(content)?
            }
            _ => {
                return Err(ConfigError::unsupported_format(format))
            }
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `HESTIA__SERVER__HTTP_ADDR=0.0.0.0:9000`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory into the environment.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Applies the environment layer, if a prefix was set, and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation fails.
    pub fn load(mut self) -> Result<HestiaConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let env_vars: HashMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            // Server section
            ["SERVER", "HTTP_ADDR"] => {
                config.server.http_addr = value.to_string();
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_number(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                config.server.request_timeout_ms = parse_number(key, value)?;
            }
            ["SERVER", "MAX_BODY_BYTES"] => {
                config.server.max_body_bytes = parse_number(key, value)?;
            }

            // Telemetry section
            ["TELEMETRY", "SERVICE_NAME"] => {
                config.telemetry.service_name = value.to_string();
            }
            ["TELEMETRY", "ENVIRONMENT"] => {
                config.telemetry.environment = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                config.telemetry.logging.enabled = parse_flag(key, value)?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                config.telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                config.telemetry.logging.include_location = parse_flag(key, value)?;
            }
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                config.telemetry.metrics.enabled = parse_flag(key, value)?;
            }

            // CORS section
            ["CORS", "ENABLED"] => {
                config.cors.enabled = parse_flag(key, value)?;
            }
            ["CORS", "ALLOWED_ORIGINS"] => {
                config.cors.allowed_origins = parse_list(value);
            }
            ["CORS", "ALLOWED_METHODS"] => {
                config.cors.allowed_methods = parse_list(value);
            }
            ["CORS", "ALLOWED_HEADERS"] => {
                config.cors.allowed_headers = parse_list(value);
            }
            ["CORS", "ALLOW_CREDENTIALS"] => {
                config.cors.allow_credentials = parse_flag(key, value)?;
            }
            ["CORS", "MAX_AGE_SECS"] => {
                config.cors.max_age_secs = parse_number(key, value)?;
            }

            // API section
            ["API", "WELCOME_MESSAGE"] => {
                config.api.welcome_message = value.to_string();
            }
            ["API", "DOCS_URL"] => {
                config.api.docs_url = value.to_string();
            }

            _ => {
                return Err(ConfigError::env_parse_error(key, "unknown configuration key"));
            }
        }

        Ok(())
    }
}

/// Recursively merges `layer` into `base`. Objects merge per key; any other
/// value in `layer` replaces the one in `base`.
fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected non-negative integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Accepts the usual spellings of on and off, case-insensitively.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
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
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:8000");
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.telemetry.logging.level, "debug");
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"server": {"http_addr": "127.0.0.1:3000"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_file_layer_keeps_preset_values() {
        let config = ConfigLoader::new()
            .with_development()
            .with_string("[server]\nmax_body_bytes = 2048", "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.max_body_bytes, 2048);
        assert_eq!(config.telemetry.logging.level, "debug");
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_field_in_layer_rejected() {
        let result = ConfigLoader::new().with_string("[server]\nport = 80", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));

        let result = ConfigLoader::new().with_string(r#"{"cors": {"origin": "*"}}"#, "json");
        assert!(matches!(result, Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigLoader::new().with_string("a: b", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/hestia.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/hestia.toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.http_addr, "127.0.0.1:8000");
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [telemetry]
            service_name = "inventory"

            [api]
            welcome_message = "Bienvenido al inventario"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.telemetry.service_name, "inventory");
        assert_eq!(config.api.welcome_message, "Bienvenido al inventario");
        assert_eq!(config.api.docs_url, "/docs");
    }

    #[test]
    fn test_loader_with_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"cors": {{"enabled": false}}}}"#).unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert!(!config.cors.enabled);
    }

    #[test]
    fn test_loader_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[server]\nhttp_addr = \"nowhere\"", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        for on in ["true", "TRUE", " 1 ", "Yes", "on"] {
            assert_eq!(parse_bool(on), Some(true), "{on}");
        }
        for off in ["false", "0", "no", "OFF"] {
            assert_eq!(parse_bool(off), Some(false), "{off}");
        }
        assert_eq!(parse_bool("enabled"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_merge_values_nested() {
        let mut base = serde_json::json!({"a": {"b": 1, "c": 2}, "d": [1]});
        merge_values(&mut base, serde_json::json!({"a": {"c": 3}, "d": [2, 3]}));
        assert_eq!(base, serde_json::json!({"a": {"b": 1, "c": 3}, "d": [2, 3]}));
    }

    // Process environment is not mutated here; apply_env_var is exercised directly.

    #[test]
    fn test_apply_env_var_server() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__SERVER__HTTP_ADDR", "192.168.1.1:9000", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__SERVER__MAX_BODY_BYTES", "4096", "TEST")
            .unwrap();
        assert_eq!(loader.config.server.http_addr, "192.168.1.1:9000");
        assert_eq!(loader.config.server.max_body_bytes, 4096);
    }

    #[test]
    fn test_apply_env_var_telemetry() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__LEVEL", "debug", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "off", "TEST")
            .unwrap();
        assert_eq!(loader.config.telemetry.logging.level, "debug");
        assert_eq!(loader.config.telemetry.logging.format, LogFormat::Pretty);
        assert!(!loader.config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_apply_env_var_cors_list() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var(
                "TEST__CORS__ALLOWED_ORIGINS",
                "https://a.example, https://b.example",
                "TEST",
            )
            .unwrap();
        assert_eq!(
            loader.config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__SERVER__REQUEST_TIMEOUT_MS", "soon", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__CORS__ENABLED", "maybe", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("TEST__SERVER__PORT", "80", "TEST");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
    }
}
