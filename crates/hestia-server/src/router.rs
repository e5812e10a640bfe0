//! Request routing and path matching.
//!
//! The router maps an HTTP method and path to an operation ID, extracting
//! `{param}` segments along the way. Paths are percent-decoded before
//! matching and compared segment by segment, so `/items/` and `/items` are
//! different paths. Resolution distinguishes an unknown
//! path from a known path requested with the wrong method, so the server
//! can answer 404 and 405 respectively.
//!
//! # Example
//!
//! ```rust
//! use hestia_server::{RouteResolution, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/items/{item_id}", "getItem");
//! router.add_route(Method::DELETE, "/items/{item_id}", "deleteItem");
//!
//! let m = router.match_route(&Method::GET, "/items/7").unwrap();
//! assert_eq!(m.operation_id(), "getItem");
//! assert_eq!(m.param("item_id"), Some("7"));
//!
//! match router.resolve(&Method::POST, "/items/7") {
//!     RouteResolution::MethodNotAllowed(allowed) => assert_eq!(allowed.len(), 2),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use http::Method;

/// A matched route with extracted path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The operation ID of the matched route
    operation_id: String,

    /// Extracted path parameters (e.g., `item_id` from `/items/{item_id}`)
    params: HashMap<String, String>,
}

impl RouteMatch {
    /// Creates a new route match.
    #[must_use]
    pub fn new(operation_id: impl Into<String>, params: HashMap<String, String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            params,
        }
    }

    /// Returns the operation ID for this route.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the extracted path parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns a specific path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Consumes the match, returning the operation ID and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, HashMap<String, String>) {
        (self.operation_id, self.params)
    }
}

/// Outcome of resolving a request against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResolution {
    /// A route matched both path and method.
    Matched(RouteMatch),

    /// The path is known but not for this method. Holds the methods that
    /// are registered for the path, in registration order.
    MethodNotAllowed(Vec<Method>),

    /// No route has this path.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    segments: Vec<PathSegment>,
    operation_id: String,
}

impl Route {
    fn new(method: Method, pattern: &str, operation_id: impl Into<String>) -> Self {
        Self {
            method,
            segments: Self::parse_segments(pattern),
            operation_id: operation_id.into(),
        }
    }

    fn parse_segments(pattern: &str) -> Vec<PathSegment> {
        split_path(pattern)
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => PathSegment::Param(name.to_string()),
                None => PathSegment::Literal(s.to_string()),
            })
            .collect()
    }

    /// Returns extracted parameters if the path matches this route's shape.
    fn match_path(&self, path_segments: &[&str]) -> Option<HashMap<String, String>> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();

        for (pattern, actual) in self.segments.iter().zip(path_segments) {
            match pattern {
                PathSegment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }

        Some(params)
    }
}

/// Splits after the leading `/`, keeping empty segments.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Percent-decodes a request path; invalid UTF-8 becomes U+FFFD.
fn decode_path(path: &str) -> Cow<'_, str> {
    if !path.contains('%') {
        return Cow::Borrowed(path);
    }
    let bytes = urlencoding::decode_binary(path.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

/// HTTP request router.
///
/// Routes are tried in registration order; the first route whose path and
/// method both match wins.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Adds a route.
    ///
    /// `pattern` uses `{name}` for path parameters, e.g. `/items/{item_id}`.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: impl AsRef<str>,
        operation_id: impl Into<String>,
    ) {
        self.routes
            .push(Route::new(method, pattern.as_ref(), operation_id));
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Resolves a request, telling apart unknown paths and wrong methods.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> RouteResolution {
        let decoded = decode_path(path);
        let path_segments: Vec<&str> = split_path(&decoded).collect();
        let mut allowed = Vec::new();

        for route in &self.routes {
            if let Some(params) = route.match_path(&path_segments) {
                if route.method == *method {
                    return RouteResolution::Matched(RouteMatch::new(
                        route.operation_id.clone(),
                        params,
                    ));
                }
                if !allowed.contains(&route.method) {
                    allowed.push(route.method.clone());
                }
            }
        }

        if allowed.is_empty() {
            RouteResolution::NotFound
        } else {
            RouteResolution::MethodNotAllowed(allowed)
        }
    }

    /// Matches a request, returning `None` for both 404 and 405 outcomes.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        match self.resolve(method, path) {
            RouteResolution::Matched(m) => Some(m),
            _ => None,
        }
    }

    /// Returns `true` if any route maps to the operation.
    #[must_use]
    pub fn has_operation(&self, operation_id: &str) -> bool {
        self.routes.iter().any(|r| r.operation_id == operation_id)
    }

    /// Returns all operation IDs in registration order.
    #[must_use]
    pub fn operation_ids(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.operation_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_router() -> Router {
        let mut router = Router::new();
        router.add_route(Method::GET, "/", "readRoot");
        router.add_route(Method::GET, "/items", "listItems");
        router.add_route(Method::POST, "/items", "createItem");
        router.add_route(Method::GET, "/items/{item_id}", "getItem");
        router.add_route(Method::PUT, "/items/{item_id}", "updateItem");
        router.add_route(Method::DELETE, "/items/{item_id}", "deleteItem");
        router
    }

    #[test]
    fn test_root_matches() {
        let router = item_router();
        let m = router.match_route(&Method::GET, "/").unwrap();
        assert_eq!(m.operation_id(), "readRoot");
        assert!(m.params().is_empty());
    }

    #[test]
    fn test_literal_and_param_routes() {
        let router = item_router();

        assert_eq!(
            router.match_route(&Method::GET, "/items").unwrap().operation_id(),
            "listItems"
        );
        assert_eq!(
            router.match_route(&Method::POST, "/items").unwrap().operation_id(),
            "createItem"
        );

        let m = router.match_route(&Method::PUT, "/items/42").unwrap();
        assert_eq!(m.operation_id(), "updateItem");
        assert_eq!(m.param("item_id"), Some("42"));
    }

    #[test]
    fn test_param_captures_any_segment() {
        let router = item_router();
        let m = router.match_route(&Method::GET, "/items/abc").unwrap();
        assert_eq!(m.param("item_id"), Some("abc"));
    }

    #[test]
    fn test_extra_slashes_are_not_found() {
        let router = item_router();
        for path in ["/items/", "/items/1/", "/items//1", "//"] {
            assert_eq!(router.resolve(&Method::GET, path), RouteResolution::NotFound, "{path}");
        }
    }

    #[test]
    fn test_params_are_percent_decoded() {
        let router = item_router();
        let m = router.match_route(&Method::GET, "/items/%31%32").unwrap();
        assert_eq!(m.param("item_id"), Some("12"));

        let m = router.match_route(&Method::GET, "/items/caf%C3%A9").unwrap();
        assert_eq!(m.param("item_id"), Some("café"));

        assert_eq!(
            router.match_route(&Method::GET, "/%69tems").unwrap().operation_id(),
            "listItems"
        );
    }

    #[test]
    fn test_encoded_slash_splits_segments() {
        let router = item_router();
        assert_eq!(
            router.resolve(&Method::GET, "/items/1%2F2"),
            RouteResolution::NotFound
        );
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let router = item_router();
        assert_eq!(router.resolve(&Method::GET, "/users"), RouteResolution::NotFound);
        assert_eq!(
            router.resolve(&Method::GET, "/items/1/extra"),
            RouteResolution::NotFound
        );
    }

    #[test]
    fn test_wrong_method_lists_allowed() {
        let router = item_router();

        match router.resolve(&Method::PATCH, "/items/1") {
            RouteResolution::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![Method::GET, Method::PUT, Method::DELETE]);
            }
            other => panic!("expected MethodNotAllowed, got {other:?}"),
        }

        match router.resolve(&Method::DELETE, "/items") {
            RouteResolution::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![Method::GET, Method::POST]);
            }
            other => panic!("expected MethodNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn test_operation_lookup() {
        let router = item_router();
        assert_eq!(router.route_count(), 6);
        assert!(router.has_operation("deleteItem"));
        assert!(!router.has_operation("patchItem"));
        assert_eq!(router.operation_ids()[0], "readRoot");
    }

    #[test]
    fn test_into_parts() {
        let router = item_router();
        let (op, params) = router
            .match_route(&Method::DELETE, "/items/9")
            .unwrap()
            .into_parts();
        assert_eq!(op, "deleteItem");
        assert_eq!(params.get("item_id").map(String::as_str), Some("9"));
    }
}
