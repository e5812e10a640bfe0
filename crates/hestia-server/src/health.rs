//! Liveness and readiness endpoints.
//!
//! - `/health` reports that the process is up, with service name, version
//!   and uptime.
//! - `/ready` reports whether the server accepts traffic. It flips to
//!   not-ready as soon as graceful shutdown begins.
//!
//! # Example
//!
//! ```rust
//! use hestia_server::{HealthCheck, ReadinessCheck};
//!
//! let health = HealthCheck::new("hestia", "0.1.0");
//! assert_eq!(health.status().status, "healthy");
//!
//! let readiness = ReadinessCheck::new();
//! assert!(readiness.is_ready());
//! readiness.set_ready(false);
//! assert!(!readiness.is_ready());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Body of the `/health` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Always `"healthy"`; an unhealthy process does not answer.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Whole seconds since the server was built.
    pub uptime_seconds: u64,
}

/// Liveness check. Always healthy while the process runs.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    start_time: Instant,
}

impl HealthCheck {
    /// Creates a health check; uptime counts from this call.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            start_time: Instant::now(),
        }
    }

    /// Returns the current health status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            service: self.service.clone(),
            version: self.version.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Body of the `/ready` response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessStatus {
    /// Whether new requests are welcome.
    pub ready: bool,
}

/// Readiness flag, cleared when graceful shutdown begins.
///
/// Clones share the flag.
#[derive(Debug, Clone)]
pub struct ReadinessCheck {
    accepting: Arc<AtomicBool>,
}

impl ReadinessCheck {
    /// Creates a check that starts ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns whether the server accepts traffic.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Snapshot for the `/ready` body.
    #[must_use]
    pub fn status(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: self.is_ready(),
        }
    }

    /// Marks the server as accepting traffic or not.
    pub fn set_ready(&self, ready: bool) {
        self.accepting.store(ready, Ordering::Release);
    }
}

impl Default for ReadinessCheck {
    fn default() -> Self {
        Self::new()
    }
}
