//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use hestia_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("0.0.0.0:8000")
//!     .request_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "0.0.0.0:8000");
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default request body limit in bytes (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Server configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address (e.g., "127.0.0.1:8000")
    http_addr: String,

    /// How long to wait for in-flight connections on shutdown
    shutdown_timeout: Duration,

    /// Bound on body collection and on handler execution, each
    request_timeout: Duration,

    /// Largest accepted request body
    max_body_bytes: usize,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses the HTTP address as a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns the shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the request body limit in bytes.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfigBuilder::new().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    max_body_bytes: usize,
}

impl ServerConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the request body limit.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Builds the server configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            shutdown_timeout: self.shutdown_timeout,
            request_timeout: self.request_timeout,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr(), DEFAULT_HTTP_ADDR);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_body_bytes(), 1024 * 1024);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServerConfig::builder()
            .http_addr("0.0.0.0:9000")
            .shutdown_timeout(Duration::from_secs(5))
            .request_timeout(Duration::from_millis(250))
            .max_body_bytes(64)
            .build();

        assert_eq!(config.http_addr(), "0.0.0.0:9000");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.max_body_bytes(), 64);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 8000);

        let bad = ServerConfig::builder().http_addr("nope").build();
        assert!(bad.socket_addr().is_err());
    }
}
