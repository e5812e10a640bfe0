//! Main configuration type.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{ApiSection, ConfigError, CorsSection, LogFormat, ServerSection, TelemetrySection};

/// Complete Hestia configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use hestia_config::HestiaConfig;
///
/// let config = HestiaConfig::default();
/// assert_eq!(config.server.http_addr, "127.0.0.1:8000");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HestiaConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerSection,

    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetrySection,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsSection,

    /// Root endpoint content.
    #[serde(default)]
    pub api: ApiSection,
}

impl HestiaConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The bind address is not a socket address
    /// - The request timeout or body limit is zero
    /// - The log level is empty
    /// - A CORS method is not a valid HTTP method token
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.telemetry.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.logging.level",
                "must not be empty",
            ));
        }

        if let Some(method) = self
            .cors
            .allowed_methods
            .iter()
            .find(|m| m.is_empty() || !m.bytes().all(|b| b.is_ascii_alphabetic()))
        {
            return Err(ConfigError::invalid_value(
                "cors.allowed_methods",
                format!("invalid HTTP method: {method:?}"),
            ));
        }

        Ok(())
    }

    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the address does not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }

    /// Create a development configuration preset.
    ///
    /// Pretty logs at debug level with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use hestia_config::{HestiaConfig, LogFormat};
    ///
    /// let config = HestiaConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();
        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level, listening on all interfaces.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "0.0.0.0:8000".to_string();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.environment = "production".to_string();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(HestiaConfig::default().validate().is_ok());
        assert!(HestiaConfig::development().validate().is_ok());
        assert!(HestiaConfig::production().validate().is_ok());
    }

    #[test]
    fn test_invalid_addr_rejected() {
        let mut config = HestiaConfig::default();
        config.server.http_addr = "localhost".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = HestiaConfig::default();
        config.server.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let mut config = HestiaConfig::default();
        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_cors_method_rejected() {
        let mut config = HestiaConfig::default();
        config.cors.allowed_methods.push("GE T".to_string());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cors.allowed_methods"));
    }

    #[test]
    fn test_production_preset() {
        let config = HestiaConfig::production();
        assert_eq!(config.telemetry.environment, "production");
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_unknown_top_level_section_rejected() {
        let result: Result<HestiaConfig, _> = toml::from_str("[database]\nurl = \"x\"");
        assert!(result.is_err());
    }
}
