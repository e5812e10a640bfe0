//! Request context types.
//!
//! The [`RequestContext`] carries per-request state from the server into
//! handlers: the request id used for log correlation, the matched
//! operation, and the path parameters extracted by the router.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier used to correlate a request's logs and its response.
///
/// Fresh ids are UUID v7, which keeps them sortable in logs. An id supplied
/// by the client is kept verbatim so callers can trace their own ids.
///
/// # Example
///
/// ```
/// use hestia_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.as_str().len(), 36);
///
/// let supplied = RequestId::parse("trace-42").unwrap();
/// assert_eq!(supplied.as_str(), "trace-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Longest client-supplied id that is accepted.
    pub const MAX_LEN: usize = 128;

    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Accepts a client-supplied id, e.g. an `x-request-id` header.
    ///
    /// Surrounding whitespace is trimmed. Returns `None` for an empty id,
    /// one longer than [`MAX_LEN`](Self::MAX_LEN), or one containing
    /// anything but visible ASCII.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let valid = !value.is_empty()
            && value.len() <= Self::MAX_LEN
            && value.bytes().all(|b| b.is_ascii_graphic());
        valid.then(|| Self(value.to_string()))
    }

    /// Returns the id as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-request state handed to every handler.
///
/// # Example
///
/// ```
/// use hestia_core::RequestContext;
///
/// let ctx = RequestContext::new()
///     .with_operation_id("getItem")
///     .with_path_param("item_id", "3");
///
/// assert_eq!(ctx.operation_id(), Some("getItem"));
/// assert_eq!(ctx.path_param("item_id"), Some("3"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    operation_id: Option<String>,
    path_params: HashMap<String, String>,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a new request context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            operation_id: None,
            path_params: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Returns the matched operation ID, if routing has happened.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Returns a new context with the specified operation ID.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Returns a new context carrying the given path parameters.
    #[must_use]
    pub fn with_path_params(mut self, params: HashMap<String, String>) -> Self {
        self.path_params = params;
        self
    }

    /// Returns a new context with one more path parameter.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Returns a path parameter by name.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
