//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why a [`HestiaConfig`](crate::HestiaConfig) could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("config file {} does not exist", .path.display())]
    FileNotFound {
        /// The requested path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read config file {}", .path.display())]
    ReadError {
        /// The file being read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A TOML layer is malformed or has unknown keys.
    #[error("invalid TOML config: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A JSON layer is malformed, or a merged layer no longer fits the schema.
    #[error("invalid JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A value parsed but is not acceptable.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending key, e.g. `server.http_addr`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `HESTIA__*` variable names an unknown key or holds a bad value.
    #[error("environment variable {var}: {reason}")]
    EnvParseError {
        /// Variable name.
        var: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `.env` file exists but could not be parsed.
    #[error("cannot load .env: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// Only `toml` and `json` layers are understood.
    #[error("unsupported config format: {format}")]
    UnsupportedFormat {
        /// The extension or format name that was given.
        format: String,
    },
}

impl ConfigError {
    pub(crate) fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub(crate) fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Reports an unacceptable value for `field`.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let cases = [
            (ConfigError::file_not_found("/etc/hestia.toml"), "/etc/hestia.toml"),
            (
                ConfigError::invalid_value("server.max_body_bytes", "must be greater than zero"),
                "server.max_body_bytes: must be greater than zero",
            ),
            (
                ConfigError::env_parse_error("HESTIA__SERVER__MAX_BODY_BYTES", "expected integer"),
                "HESTIA__SERVER__MAX_BODY_BYTES",
            ),
            (ConfigError::unsupported_format("yaml"), "yaml"),
        ];

        for (err, needle) in cases {
            let message = err.to_string();
            assert!(message.contains(needle), "{message:?} lacks {needle:?}");
        }
    }

    #[test]
    fn test_read_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::read_error("hestia.toml", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
