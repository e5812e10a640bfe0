//! HTTP server implementation.
//!
//! The server binds a TCP listener, serves each connection with hyper's
//! HTTP/1.1 implementation, and passes every request through
//! [`Server::handle`]:
//!
//! 1. CORS preflight (answered directly when CORS is enabled)
//! 2. Built-in `/health`, `/ready` and `/metrics`
//! 3. Route resolution: 404 for unknown paths, 405 with `Allow` for a
//!    known path with the wrong method
//! 4. Body collection, bounded by size and time
//! 5. Handler invocation, bounded by time
//!
//! Every response carries `x-request-id` and, when CORS is enabled, the
//! CORS response headers. Each request is counted in the metrics and
//! logged once on completion.
//!
//! # Example
//!
//! ```rust,ignore
//! use hestia_server::{HandlerRegistry, Server};
//! use http::Method;
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
//! server.run().await?;
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use hestia_core::{HestiaError, RequestContext, RequestId};
use hestia_telemetry::{record_request, render_metrics, InFlightGuard};

use crate::config::{ServerConfig, ServerConfigBuilder};
use crate::cors::Cors;
use crate::handler::{HandlerRegistry, InvokeError, Reply};
use crate::health::{HealthCheck, ReadinessCheck};
use crate::response::{self, HttpResponse};
use crate::router::{RouteResolution, Router};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Operation labels for requests that never reach a handler.
mod labels {
    pub const PREFLIGHT: &str = "corsPreflight";
    pub const HEALTH: &str = "health";
    pub const READY: &str = "ready";
    pub const METRICS: &str = "metrics";
    pub const NOT_FOUND: &str = "notFound";
    pub const METHOD_NOT_ALLOWED: &str = "methodNotAllowed";
}

/// The Hestia HTTP server.
pub struct Server {
    config: ServerConfig,
    router: Router,
    handlers: HandlerRegistry,
    health: HealthCheck,
    readiness: ReadinessCheck,
    cors: Option<Cors>,
    metrics_enabled: bool,
}

impl Server {
    /// Creates a server with the given configuration and no routes.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            handlers: HandlerRegistry::new(),
            health: HealthCheck::new("hestia", env!("CARGO_PKG_VERSION")),
            readiness: ReadinessCheck::new(),
            cors: None,
            metrics_enabled: true,
        }
    }

    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the handler registry.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Returns the health check.
    #[must_use]
    pub fn health(&self) -> &HealthCheck {
        &self.health
    }

    /// Returns the readiness check.
    #[must_use]
    pub fn readiness(&self) -> &ReadinessCheck {
        &self.readiness
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address is invalid or cannot be
    /// bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address is invalid or cannot be
    /// bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!("Invalid address '{}': {}", self.config.http_addr(), e))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("Failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// triggers, then waits up to the shutdown timeout for open
    /// connections to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] if the listener's address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => match result {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = server.serve_connection(stream, remote_addr, shutdown).await {
                                tracing::debug!(remote = %remote_addr, error = %e, "Connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to accept connection");
                    }
                },

                () = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        server.readiness.set_ready(false);
        drop(listener);

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            connections = tracker.active_connections(),
            "Waiting for connections to close"
        );

        if tokio::time::timeout(shutdown_timeout, tracker.wait_for_drain())
            .await
            .is_err()
        {
            tracing::warn!(
                connections = tracker.active_connections(),
                "Shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => return result,
            () = shutdown.recv() => {
                tracing::debug!(remote = %remote_addr, "Closing connection for shutdown");
                conn.as_mut().graceful_shutdown();
            }
        }

        conn.await
    }

    /// Handles one request and produces its response.
    ///
    /// This is the whole request pipeline without the network; tests drive
    /// it directly.
    pub async fn handle<B>(&self, req: Request<B>) -> HttpResponse
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let started = Instant::now();
        let _in_flight = InFlightGuard::new();

        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default();
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let origin = req.headers().get(header::ORIGIN).cloned();

        let (operation, mut response) = self.dispatch(request_id.clone(), req).await;

        if let Some(cors) = &self.cors {
            if operation != labels::PREFLIGHT {
                cors.apply(origin.as_ref(), &mut response);
            }
        }
        if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }

        let elapsed = started.elapsed();
        let status = response.status().as_u16();
        record_request(&operation, status, elapsed);
        hestia_telemetry::log_request_complete!(
            request_id,
            method,
            path,
            operation,
            status,
            elapsed.as_secs_f64() * 1000.0
        );

        response
    }

    /// Returns the operation label and the response.
    async fn dispatch<B>(&self, request_id: RequestId, req: Request<B>) -> (String, HttpResponse)
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if let Some(cors) = &self.cors {
            if Cors::is_preflight(req.method(), req.headers()) {
                return (labels::PREFLIGHT.to_string(), cors.preflight(req.headers()));
            }
        }

        if req.method() == Method::GET {
            match req.uri().path() {
                "/health" => return (labels::HEALTH.to_string(), self.health_response()),
                "/ready" => return (labels::READY.to_string(), self.ready_response()),
                "/metrics" if self.metrics_enabled => {
                    if let Some(text) = render_metrics() {
                        let response = response::text(StatusCode::OK, PROMETHEUS_CONTENT_TYPE, text);
                        return (labels::METRICS.to_string(), response);
                    }
                }
                _ => {}
            }
        }

        let route = match self.router.resolve(req.method(), req.uri().path()) {
            RouteResolution::Matched(route) => route,
            RouteResolution::MethodNotAllowed(allowed) => {
                return (
                    labels::METHOD_NOT_ALLOWED.to_string(),
                    Self::method_not_allowed(&allowed),
                );
            }
            RouteResolution::NotFound => {
                return (
                    labels::NOT_FOUND.to_string(),
                    response::error(&HestiaError::not_found("Not Found")),
                );
            }
        };

        let (operation_id, params) = route.into_parts();
        let response = match self.invoke(request_id, &operation_id, params, req).await {
            Ok(reply) => Self::reply_response(reply),
            Err(e) => {
                if e.status_code().is_server_error() {
                    tracing::error!(operation_id = %operation_id, error = %e, "Request failed");
                }
                response::error(&e)
            }
        };

        (operation_id, response)
    }

    async fn invoke<B>(
        &self,
        request_id: RequestId,
        operation_id: &str,
        params: HashMap<String, String>,
        req: Request<B>,
    ) -> Result<Reply, HestiaError>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if !self.handlers.contains(operation_id) {
            tracing::warn!(operation_id, "No handler registered for operation");
            return Err(HestiaError::not_implemented(operation_id));
        }

        let body = self.collect_body(req.into_body()).await?;

        let ctx = RequestContext::with_request_id(request_id)
            .with_operation_id(operation_id)
            .with_path_params(params);

        tokio::time::timeout(
            self.config.request_timeout(),
            self.handlers.invoke(operation_id, ctx, body),
        )
        .await
        .map_err(|_| {
            tracing::warn!(operation_id, "Handler execution timed out");
            HestiaError::timeout("Handler execution timed out")
        })?
        .map_err(InvokeError::into_hestia_error)
    }

    async fn collect_body<B>(&self, body: B) -> Result<Bytes, HestiaError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let limit = self.config.max_body_bytes();

        let collected = tokio::time::timeout(
            self.config.request_timeout(),
            Limited::new(body, limit).collect(),
        )
        .await
        .map_err(|_| {
            tracing::warn!("Request body collection timed out");
            HestiaError::request_timeout("Request body collection timed out")
        })?;

        match collected {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) if e.is::<LengthLimitError>() => Err(HestiaError::payload_too_large(limit)),
            Err(e) => Err(HestiaError::bad_request(format!("Failed to read request body: {e}"))),
        }
    }

    fn reply_response(reply: Reply) -> HttpResponse {
        match reply.into_parts() {
            (status, Some(body)) => response::json(status, body),
            (status, None) => response::empty(status),
        }
    }

    fn health_response(&self) -> HttpResponse {
        match serde_json::to_vec(&self.health.status()) {
            Ok(body) => response::json(StatusCode::OK, body),
            Err(e) => response::error(&HestiaError::internal_with_source("health", e)),
        }
    }

    fn ready_response(&self) -> HttpResponse {
        let status = self.readiness.status();
        let code = if status.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        match serde_json::to_vec(&status) {
            Ok(body) => response::json(code, body),
            Err(e) => response::error(&HestiaError::internal_with_source("ready", e)),
        }
    }

    fn method_not_allowed(allowed: &[Method]) -> HttpResponse {
        let mut response = response::error(&HestiaError::method_not_allowed());
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(header::ALLOW, value);
        }
        response
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("routes", &self.router.route_count())
            .field("handlers", &self.handlers)
            .field("cors", &self.cors.is_some())
            .field("metrics_enabled", &self.metrics_enabled)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Server`].
#[derive(Default)]
pub struct ServerBuilder {
    config_builder: ServerConfigBuilder,
    router: Router,
    handlers: HandlerRegistry,
    service_name: Option<String>,
    service_version: Option<String>,
    cors: Option<Cors>,
    metrics_enabled: Option<bool>,
}

impl ServerBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.shutdown_timeout(timeout);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.request_timeout(timeout);
        self
    }

    /// Sets the request body limit.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.config_builder = self.config_builder.max_body_bytes(limit);
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, operation_id: &str) -> Self {
        self.router.add_route(method, pattern, operation_id);
        self
    }

    /// Replaces the router.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Sets the handler registry.
    #[must_use]
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Sets the service name reported by `/health`.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Sets the service version reported by `/health`.
    #[must_use]
    pub fn service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    /// Enables CORS with the given policy.
    #[must_use]
    pub fn cors(mut self, cors: Cors) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Sets whether `/metrics` is served. Defaults to `true`.
    #[must_use]
    pub fn metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics_enabled = Some(enabled);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let mut server = Server::new(self.config_builder.build());
        server.router = self.router;
        server.handlers = self.handlers;
        server.cors = self.cors;

        if self.service_name.is_some() || self.service_version.is_some() {
            server.health = HealthCheck::new(
                self.service_name.unwrap_or_else(|| "hestia".to_string()),
                self.service_version
                    .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            );
        }
        if let Some(enabled) = self.metrics_enabled {
            server.metrics_enabled = enabled;
        }

        server
    }
}

/// Server startup errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The address is invalid or could not be bound.
    #[error("Bind error: {0}")]
    Bind(String),

    /// An I/O error on the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
