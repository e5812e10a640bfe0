//! Prometheus metrics for Hestia.
//!
//! The recorder is installed without its own HTTP listener; the server
//! renders the exposition text on its `/metrics` route.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hestia_requests_total` | Counter | `operation`, `status` | Total requests |
//! | `hestia_request_duration_seconds` | Histogram | `operation` | Request latency |
//! | `hestia_in_flight_requests` | Gauge | - | In-flight requests |
//! | `hestia_items` | Gauge | - | Items currently stored |

use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "hestia_requests_total";

/// Request latency histogram name.
pub const REQUEST_DURATION: &str = "hestia_request_duration_seconds";

/// In-flight request gauge name.
pub const IN_FLIGHT: &str = "hestia_in_flight_requests";

/// Stored item gauge name.
pub const ITEMS: &str = "hestia_items";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are recorded.
    pub enabled: bool,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the global Prometheus recorder.
///
/// Idempotent: once a recorder is installed later calls return `Ok`.
///
/// # Errors
///
/// Returns `TelemetryError::Recorder` if the recorder cannot be built or
/// another recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled || METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            &config.duration_buckets,
        )
?
        .install_recorder()?;

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests processed");
    describe_histogram!(REQUEST_DURATION, "HTTP request duration in seconds");
    describe_gauge!(IN_FLIGHT, "Number of HTTP requests currently being processed");
    describe_gauge!(ITEMS, "Number of items currently stored");
}

/// Records a completed request.
///
/// # Arguments
///
/// * `operation` - The operation ID (e.g. "getItem"), or a route label
/// * `status_code` - HTTP status code
/// * `duration` - Request duration
pub fn record_request(operation: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION, "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}

/// Sets the stored item gauge.
pub fn set_item_count(count: usize) {
    gauge!(ITEMS).set(count as f64);
}

/// Guard that tracks one in-flight request for its lifetime.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge; dropping the guard decrements it.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }
}
