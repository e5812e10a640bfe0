//! Handler registration and dispatch.
//!
//! Handlers are async functions registered against an operation ID. They
//! receive the [`RequestContext`] (request ID, operation ID, path
//! parameters) and the raw request body, and return a [`Reply`] or a
//! [`HestiaError`]. Body decoding is left to the handler so each operation
//! can report field-level validation errors in its own terms.
//!
//! # Example
//!
//! ```rust
//! use hestia_core::{HestiaError, RequestContext};
//! use hestia_server::{HandlerRegistry, Reply};
//!
//! async fn ping(_ctx: RequestContext) -> Result<Reply, HestiaError> {
//!     Reply::ok(&serde_json::json!({ "pong": true }))
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_no_body("ping", ping);
//! assert!(registry.contains("ping"));
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use hestia_core::{HestiaError, RequestContext};

/// Boxed future returned by an erased handler.
pub type BoxedHandlerResult = Pin<Box<dyn Future<Output = Result<Reply, HestiaError>> + Send>>;

/// A type-erased handler function.
pub type ErasedHandler = Arc<dyn Fn(RequestContext, Bytes) -> BoxedHandlerResult + Send + Sync>;

/// A successful handler outcome: a status and an optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: StatusCode,
    body: Option<Bytes>,
}

impl Reply {
    /// Serializes `value` as the JSON body of a response with `status`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self, HestiaError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| HestiaError::internal_with_source("Failed to serialize response", e))?;
        Ok(Self {
            status,
            body: Some(Bytes::from(bytes)),
        })
    }

    /// 200 OK with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails.
    pub fn ok<T: Serialize + ?Sized>(value: &T) -> Result<Self, HestiaError> {
        Self::json(StatusCode::OK, value)
    }

    /// 201 Created with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails.
    pub fn created<T: Serialize + ?Sized>(value: &T) -> Result<Self, HestiaError> {
        Self::json(StatusCode::CREATED, value)
    }

    /// 204 No Content with an empty body.
    #[must_use]
    pub const fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consumes the reply, returning status and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Option<Bytes>) {
        (self.status, self.body)
    }
}

/// Registry of handlers keyed by operation ID.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, ErasedHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler that receives the raw request body.
    ///
    /// Registering the same operation twice replaces the earlier handler.
    pub fn register<F, Fut>(&mut self, operation_id: impl Into<String>, handler: F)
    where
        F: Fn(RequestContext, Bytes) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, HestiaError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |ctx: RequestContext, body: Bytes| {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler(ctx, body).await })
        });

        self.handlers.insert(operation_id.into(), erased);
    }

    /// Registers a handler that ignores the request body.
    pub fn register_no_body<F, Fut>(&mut self, operation_id: impl Into<String>, handler: F)
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, HestiaError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |ctx: RequestContext, _body: Bytes| {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler(ctx).await })
        });

        self.handlers.insert(operation_id.into(), erased);
    }

    /// Looks up a handler by operation ID.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&ErasedHandler> {
        self.handlers.get(operation_id)
    }

    /// Checks if a handler is registered for an operation.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns an iterator over registered operation IDs.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Invokes the handler for `operation_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::HandlerNotFound`] if nothing is registered for
    /// the operation, or [`InvokeError::Handler`] with the handler's error.
    pub async fn invoke(
        &self,
        operation_id: &str,
        ctx: RequestContext,
        body: Bytes,
    ) -> Result<Reply, InvokeError> {
        let handler = self
            .handlers
            .get(operation_id)
            .ok_or_else(|| InvokeError::HandlerNotFound(operation_id.to_string()))?;

        handler(ctx, body).await.map_err(InvokeError::Handler)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Error returned when invoking a handler fails.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No handler registered for the operation.
    #[error("No handler registered for operation: {0}")]
    HandlerNotFound(String),

    /// The handler returned an error.
    #[error("Handler error: {0}")]
    Handler(#[source] HestiaError),
}

impl InvokeError {
    /// Converts into the error reported to the client.
    #[must_use]
    pub fn into_hestia_error(self) -> HestiaError {
        match self {
            Self::HandlerNotFound(operation_id) => HestiaError::not_implemented(operation_id),
            Self::Handler(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo(_ctx: RequestContext, body: Bytes) -> Result<Reply, HestiaError> {
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|_| HestiaError::bad_request("bad json"))?;
        Reply::created(&value)
    }

    async fn operation(ctx: RequestContext) -> Result<Reply, HestiaError> {
        Reply::ok(&ctx.operation_id().unwrap_or("none"))
    }

    #[test]
    fn test_reply_constructors() {
        let ok = Reply::ok(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.body().unwrap().as_ref(), br#"{"a":1}"#);

        let created = Reply::created(&[1, 2]).unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let empty = Reply::no_content();
        assert_eq!(empty.status(), StatusCode::NO_CONTENT);
        assert!(empty.body().is_none());
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get("nothing").is_none());
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", echo);
        registry.register_no_body("op", operation);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("echo"));
        let mut ids: Vec<_> = registry.operation_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["echo", "op"]);
    }

    #[tokio::test]
    async fn test_invoke_with_body() {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", echo);

        let reply = registry
            .invoke("echo", RequestContext::new(), Bytes::from(r#"{"x":true}"#))
            .await
            .unwrap();

        assert_eq!(reply.status(), StatusCode::CREATED);
        assert_eq!(reply.body().unwrap().as_ref(), br#"{"x":true}"#);
    }

    #[tokio::test]
    async fn test_invoke_without_body_sees_context() {
        let mut registry = HandlerRegistry::new();
        registry.register_no_body("op", operation);

        let ctx = RequestContext::new().with_operation_id("op");
        let reply = registry.invoke("op", ctx, Bytes::new()).await.unwrap();
        assert_eq!(reply.body().unwrap().as_ref(), br#""op""#);
    }

    #[tokio::test]
    async fn test_invoke_handler_error() {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", echo);

        let err = registry
            .invoke("echo", RequestContext::new(), Bytes::from("nope"))
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::Handler(_)));
        assert_eq!(err.into_hestia_error().status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invoke_missing_handler() {
        let registry = HandlerRegistry::new();
        let err = registry
            .invoke("ghost", RequestContext::new(), Bytes::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("ghost"));
        assert_eq!(
            err.into_hestia_error().status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
    }
}
