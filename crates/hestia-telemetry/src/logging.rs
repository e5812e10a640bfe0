//! Structured logging for Hestia.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! JSON layer (production) or a pretty layer (development).
//!
//! # Example
//!
//! ```rust,ignore
//! use hestia_telemetry::logging::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::default())?;
//! tracing::info!(operation_id = "getItem", item_id = 3, "Processing request");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Emit anything at all.
    pub enabled: bool,

    /// `EnvFilter` directive, e.g. `info` or `hestia=debug,hyper=warn`.
    pub level: String,

    /// One JSON object per event instead of multi-line pretty output.
    pub json_format: bool,

    /// Attach source file and line to each event.
    pub file_line_info: bool,

    /// Attach the module path to each event.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty output at `debug` with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            file_line_info: true,
            ..Self::production()
        }
    }

    /// JSON output at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            file_line_info: false,
            include_target: true,
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer(config: &LogConfig) -> BoxedLayer {
    let base = fmt::layer()
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_target(config.include_target);

    if config.json_format {
        base.json().boxed()
    } else {
        base.pretty().boxed()
    }
}

/// Installs the global logging subscriber.
///
/// Does nothing when logging is disabled.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` for a bad level directive, or
/// `TelemetryError::Subscriber` if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    tracing_subscriber::registry()
        .with(format_layer(config).with_filter(filter))
        .try_init()?;

    Ok(())
}

/// Parses a filter directive.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the directive does not parse.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

/// Logs one `info` event for a finished request.
///
/// Field names are fixed so log queries can rely on them: `request_id`,
/// `http.method`, `http.path`, `operation_id`, `http.status_code`,
/// `duration_ms`.
#[macro_export]
macro_rules! log_request_complete {
    ($request_id:expr, $method:expr, $path:expr, $operation:expr, $status:expr, $duration_ms:expr) => {
        tracing::info!(
            request_id = %$request_id,
            http.method = %$method,
            http.path = %$path,
            operation_id = %$operation,
            http.status_code = $status,
            duration_ms = $duration_ms,
            "Request completed"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let prod = LogConfig::default();
        assert!(prod.enabled && prod.json_format);
        assert_eq!(prod.level, "info");

        let dev = LogConfig::development();
        assert!(!dev.json_format);
        assert!(dev.file_line_info);
        assert!(dev.include_target);
        assert_eq!(dev.level, "debug");
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("hestia=debug,hyper=warn").is_ok());
        assert!(matches!(
            create_env_filter("hestia=loud"),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_disabled_logging_installs_nothing() {
        let config = LogConfig {
            enabled: false,
            level: "not a directive =".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
