//! Telemetry errors.

use thiserror::Error;

/// Why logging or metrics could not be set up.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter {directive:?}: {source}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// Another global subscriber is already installed.
    #[error("cannot install log subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    /// The Prometheus recorder could not be built or installed.
    #[error("cannot install metrics recorder: {0}")]
    Recorder(#[from] metrics_exporter_prometheus::BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_names_directive() {
        let source = tracing_subscriber::EnvFilter::try_new("hestia=loud").unwrap_err();
        let err = TelemetryError::InvalidFilter {
            directive: "hestia=loud".to_string(),
            source,
        };

        assert!(err.to_string().starts_with("invalid log filter \"hestia=loud\""));
        assert!(std::error::Error::source(&err).is_some());
    }
}
