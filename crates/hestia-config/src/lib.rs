//! Typed configuration system for Hestia.
//!
//! Configuration is layered, later layers overriding earlier ones:
//!
//! 1. Built-in defaults (or the development/production presets)
//! 2. A TOML or JSON file, merged key by key
//! 3. A `.env` file, loaded into the process environment
//! 4. Environment variables named `PREFIX__SECTION__KEY`
//!
//! Unknown fields are rejected at every level.
//!
//! # Example
//!
//! ```no_run
//! use hestia_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hestia_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("hestia.toml")?
//!     .with_env_prefix("HESTIA")
//!     .load()?;
//!
//! println!("Listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "127.0.0.1:8000"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! max_body_bytes = 1048576
//!
//! [telemetry]
//! service_name = "hestia"
//! environment = "production"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//!
//! [cors]
//! allowed_origins = ["*"]
//! allow_credentials = true
//!
//! [api]
//! welcome_message = "Bienvenido a la API creada con FastAPI"
//! docs_url = "/docs"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `HESTIA__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `HESTIA__TELEMETRY__LOGGING__LEVEL=debug`
//! - `HESTIA__CORS__ALLOWED_ORIGINS=https://a.example,https://b.example`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HestiaConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
