//! # Hestia Server
//!
//! HTTP server infrastructure for the Hestia item service:
//!
//! - HTTP/1.1 via hyper, one task per connection
//! - Method + path routing with `{param}` extraction, 404/405 handling
//! - Operation handlers returning [`Reply`] or [`hestia_core::HestiaError`]
//! - CORS, request IDs, body limits and timeouts
//! - `/health`, `/ready` and `/metrics`
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! ## Example
//!
//! ```rust
//! use hestia_core::{HestiaError, RequestContext};
//! use hestia_server::{HandlerRegistry, Reply, Server};
//! use http::Method;
//!
//! async fn ping(_ctx: RequestContext) -> Result<Reply, HestiaError> {
//!     Reply::ok(&"pong")
//! }
//!
//! let mut handlers = HandlerRegistry::new();
//! handlers.register_no_body("ping", ping);
//!
//! let server = Server::builder()
//!     .http_addr("127.0.0.1:8000")
//!     .route(Method::GET, "/ping", "ping")
//!     .handlers(handlers)
//!     .build();
//!
//! assert!(server.router().has_operation("ping"));
//! ```

#![doc(html_root_url = "https://docs.rs/hestia-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cors;
pub mod handler;
pub mod health;
pub mod response;
pub mod router;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use cors::{AllowedHeaders, AllowedOrigins, Cors, CorsBuilder};
pub use handler::{HandlerRegistry, InvokeError, Reply};
pub use health::{HealthCheck, HealthStatus, ReadinessCheck, ReadinessStatus};
pub use response::{HttpResponse, ResponseBody};
pub use router::{RouteMatch, RouteResolution, Router};
pub use server::{Server, ServerBuilder, ServerError, REQUEST_ID_HEADER};
pub use shutdown::{ConnectionTracker, ConnectionToken, ShutdownSignal};
