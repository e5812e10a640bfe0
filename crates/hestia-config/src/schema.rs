//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Server configuration section.
///
/// # Example
///
/// ```
/// use hestia_config::ServerSection;
///
/// let server = ServerSection {
///     http_addr: "0.0.0.0:8000".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(server.request_timeout_ms, 30_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// HTTP server bind address.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Request timeout in milliseconds, applied to body collection and to the handler.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or `EnvFilter` directive (e.g. `info`, `hestia=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Record metrics and serve them on `/metrics`.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name reported by logs and `/health`.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deployment environment (e.g. "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

fn default_service_name() -> String {
    "hestia".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Cross-origin resource sharing section.
///
/// The defaults allow any origin, method and header, with credentials.
/// With credentials enabled the concrete request origin is echoed back
/// instead of `*`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CorsSection {
    /// Enable CORS handling.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Allowed origins. `"*"` allows any.
    #[serde(default = "default_wildcard")]
    pub allowed_origins: Vec<String>,

    /// Allowed methods for preflight requests.
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed request headers. `"*"` allows any.
    #[serde(default = "default_wildcard")]
    pub allowed_headers: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`.
    #[serde(default = "default_true")]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: default_wildcard(),
            allowed_methods: default_cors_methods(),
            allowed_headers: default_wildcard(),
            allow_credentials: true,
            max_age_secs: default_max_age(),
        }
    }
}

fn default_wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "HEAD"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_age() -> u64 {
    600
}

/// Root endpoint content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// `message` returned by `GET /`.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// `docs` returned by `GET /`.
    #[serde(default = "default_docs_url")]
    pub docs_url: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome_message(),
            docs_url: default_docs_url(),
        }
    }
}

fn default_welcome_message() -> String {
    "Bienvenido a la API creada con FastAPI".to_string()
}

fn default_docs_url() -> String {
    "/docs".to_string()
}

fn default_true() -> bool {
    true
}
