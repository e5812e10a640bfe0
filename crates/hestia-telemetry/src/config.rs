//! Telemetry configuration.

use crate::logging::LogConfig;
use crate::metrics::MetricsConfig;

/// Settings for every telemetry subsystem.
///
/// ```
/// use hestia_telemetry::{LogConfig, TelemetryConfig};
///
/// let config = TelemetryConfig::new("hestia")
///     .with_environment("staging")
///     .with_logging(LogConfig::development());
/// assert!(config.metrics.enabled);
/// ```
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name, attached to the startup log and `/health`.
    pub service_name: String,

    /// Deployment environment, e.g. `production`.
    pub environment: String,

    /// Prometheus settings.
    pub metrics: MetricsConfig,

    /// Log output settings.
    pub logging: LogConfig,
}

impl TelemetryConfig {
    /// Default settings for `service_name`.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    /// Sets the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Replaces the logging settings.
    #[must_use]
    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Replaces the metrics settings.
    #[must_use]
    pub fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "hestia".to_string(),
            environment: "development".to_string(),
            metrics: MetricsConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = TelemetryConfig::new("inventory")
            .with_environment("production")
            .with_logging(LogConfig::development())
            .with_metrics(MetricsConfig {
                enabled: false,
                ..MetricsConfig::default()
            });

        assert_eq!(config.service_name, "inventory");
        assert_eq!(config.environment, "production");
        assert!(!config.logging.json_format);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_defaults() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "hestia");
        assert!(config.logging.json_format);
        assert!(config.metrics.enabled);
    }
}
