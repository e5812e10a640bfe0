//! # Hestia
//!
//! An in-memory item catalogue served over HTTP.
//!
//! | Method | Path               | Operation    |
//! |--------|--------------------|--------------|
//! | GET    | `/`                | `readRoot`   |
//! | GET    | `/items`           | `listItems`  |
//! | POST   | `/items`           | `createItem` |
//! | GET    | `/items/{item_id}` | `getItem`    |
//! | PUT    | `/items/{item_id}` | `updateItem` |
//! | DELETE | `/items/{item_id}` | `deleteItem` |
//!
//! This crate wires the item handlers into a [`hestia_server::Server`];
//! the `hestia` binary adds the CLI and process lifecycle on top.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hestia_config::HestiaConfig;
//! use hestia_core::ItemRepository;
//!
//! # async fn example() -> Result<(), hestia_server::ServerError> {
//! let config = HestiaConfig::default();
//! let server = hestia::build_server(&config, Arc::new(ItemRepository::new()));
//! server.run().await
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/hestia/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod handlers;
pub mod payload;

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use tokio::net::TcpListener;

use hestia_config::{CorsSection, HestiaConfig, LogFormat};
use hestia_core::ItemRepository;
use hestia_server::{Cors, HandlerRegistry, Server, ServerError, ShutdownSignal};
use hestia_telemetry::{set_item_count, LogConfig, MetricsConfig, TelemetryConfig};

pub use handlers::{operations, ItemHandlers, ITEM_NOT_FOUND};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the item server for `config`, storing items in `repository`.
#[must_use]
pub fn build_server(config: &HestiaConfig, repository: Arc<ItemRepository>) -> Server {
    let mut registry = HandlerRegistry::new();
    ItemHandlers::new(repository, config.api.clone()).register(&mut registry);

    let builder = Server::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .request_timeout(Duration::from_millis(config.server.request_timeout_ms))
        .max_body_bytes(config.server.max_body_bytes)
        .route(Method::GET, "/", operations::READ_ROOT)
        .route(Method::GET, "/items", operations::LIST_ITEMS)
        .route(Method::POST, "/items", operations::CREATE_ITEM)
        .route(Method::GET, "/items/{item_id}", operations::GET_ITEM)
        .route(Method::PUT, "/items/{item_id}", operations::UPDATE_ITEM)
        .route(Method::DELETE, "/items/{item_id}", operations::DELETE_ITEM)
        .handlers(registry)
        .service_name(config.telemetry.service_name.clone())
        .service_version(VERSION)
        .metrics_enabled(config.telemetry.metrics.enabled);

    match cors_policy(&config.cors) {
        Some(cors) => builder.cors(cors).build(),
        None => builder.build(),
    }
}

/// Translates the `[cors]` section into a policy, or `None` when disabled.
#[must_use]
pub fn cors_policy(section: &CorsSection) -> Option<Cors> {
    if !section.enabled {
        return None;
    }

    let methods = section
        .allowed_methods
        .iter()
        .filter_map(|m| match Method::from_bytes(m.to_ascii_uppercase().as_bytes()) {
            Ok(method) => Some(method),
            Err(_) => {
                tracing::warn!(method = %m, "Ignoring invalid CORS method");
                None
            }
        });

    Some(
        Cors::builder()
            .allow_origins(section.allowed_origins.iter().cloned())
            .allow_methods(methods)
            .allow_headers(section.allowed_headers.iter().cloned())
            .allow_credentials(section.allow_credentials)
            .max_age(Duration::from_secs(section.max_age_secs))
            .build(),
    )
}

/// Derives the telemetry settings from the `[telemetry]` section.
#[must_use]
pub fn telemetry_config(config: &HestiaConfig) -> TelemetryConfig {
    let section = &config.telemetry;
    let logging = LogConfig {
        enabled: section.logging.enabled,
        level: section.logging.level.clone(),
        json_format: section.logging.format == LogFormat::Json,
        file_line_info: section.logging.include_location,
        include_target: true,
    };
    let metrics = MetricsConfig {
        enabled: section.metrics.enabled,
        ..MetricsConfig::default()
    };

    TelemetryConfig::new(section.service_name.clone())
        .with_environment(section.environment.clone())
        .with_logging(logging)
        .with_metrics(metrics)
}

/// Binds the configured address and serves until `shutdown` triggers.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or in use.
pub async fn run(config: &HestiaConfig, shutdown: ShutdownSignal) -> Result<(), ServerError> {
    let addr = config
        .socket_addr()
        .map_err(|e| ServerError::Bind(e.to_string()))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("Failed to bind to {addr}: {e}")))?;

    serve(config, listener, shutdown).await
}

/// Serves the item API on `listener` with a fresh, empty repository.
///
/// The repository lives exactly as long as this call.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the listener fails.
pub async fn serve(
    config: &HestiaConfig,
    listener: TcpListener,
    shutdown: ShutdownSignal,
) -> Result<(), ServerError> {
    let repository = Arc::new(ItemRepository::new().with_count_observer(set_item_count));
    let server = build_server(config, Arc::clone(&repository));

    tracing::info!(
        service = %config.telemetry.service_name,
        version = VERSION,
        environment = %config.telemetry.environment,
        "Iniciando aplicación"
    );

    let result = server.serve(listener, shutdown).await;

    tracing::info!(items = repository.len(), "Cerrando aplicación");
    result
}
