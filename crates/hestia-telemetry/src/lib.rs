//! Observability for Hestia.
//!
//! - **Logging**: structured JSON or pretty output via `tracing-subscriber`
//! - **Metrics**: Prometheus exposition via the `metrics` facade
//!
//! # Metrics Endpoint
//!
//! The server's `/metrics` route returns [`render_metrics`] output:
//!
//! ```text
//! # HELP hestia_requests_total Total number of HTTP requests processed
//! # TYPE hestia_requests_total counter
//! hestia_requests_total{operation="createItem",status="201"} 12
//! hestia_requests_total{operation="getItem",status="404"} 3
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, record_request, render_metrics, set_item_count, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
///
/// # Example
///
/// ```rust,ignore
/// use hestia_telemetry::{init_telemetry, TelemetryConfig};
///
/// init_telemetry(&TelemetryConfig::new("hestia"))?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;

    tracing::debug!(
        service = %config.service_name,
        environment = %config.environment,
        metrics = config.metrics.enabled,
        "telemetry initialized"
    );

    Ok(())
}
