//! CORS (Cross-Origin Resource Sharing).
//!
//! Preflight `OPTIONS` requests (carrying both `Origin` and
//! `Access-Control-Request-Method`) are answered directly, before routing.
//! Every other response to a request with an allowed `Origin` gets
//! `Access-Control-Allow-Origin` and related headers added.
//!
//! With a wildcard origin and credentials enabled, the request's `Origin`
//! is echoed instead of `*`, since browsers reject `*` on credentialed
//! responses.
//!
//! # Example
//!
//! ```rust
//! use hestia_server::Cors;
//! use http::Method;
//! use std::time::Duration;
//!
//! let cors = Cors::builder()
//!     .allow_origin("https://app.example.com")
//!     .allow_methods([Method::GET, Method::POST])
//!     .allow_headers(["content-type"])
//!     .max_age(Duration::from_secs(600))
//!     .build();
//!
//! assert!(cors.is_origin_allowed("https://app.example.com"));
//! assert!(!cors.is_origin_allowed("https://evil.example.com"));
//! ```

use std::collections::HashSet;
use std::time::Duration;

use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, StatusCode};

use hestia_core::HestiaError;

use crate::response::{self, HttpResponse};

/// Origins allowed to make cross-origin requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Any origin.
    Any,
    /// Only the listed origins.
    List(HashSet<String>),
}

impl AllowedOrigins {
    /// Checks whether an origin is allowed.
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::List(origins) => origins.contains(origin),
        }
    }
}

/// Request headers allowed on cross-origin requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedHeaders {
    /// Any header; preflights echo the requested headers.
    Any,
    /// Only the listed headers (lowercase).
    List(HashSet<String>),
}

/// CORS policy.
#[derive(Debug, Clone)]
pub struct Cors {
    origins: AllowedOrigins,
    methods: Vec<Method>,
    headers: AllowedHeaders,
    expose_headers: Vec<String>,
    allow_credentials: bool,
    max_age: Option<Duration>,
}

impl Cors {
    /// Creates a builder. With no further calls it allows no origins.
    #[must_use]
    pub fn builder() -> CorsBuilder {
        CorsBuilder::new()
    }

    /// Any origin, method and header, with credentials.
    #[must_use]
    pub fn permissive() -> Self {
        CorsBuilder::new()
            .allow_any_origin()
            .allow_methods([
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_any_header()
            .allow_credentials(true)
            .build()
    }

    /// Checks whether an origin is allowed.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.origins.is_allowed(origin)
    }

    /// Returns `true` if the request is a CORS preflight.
    #[must_use]
    pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
        method == Method::OPTIONS
            && headers.contains_key(header::ORIGIN)
            && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
    }

    /// Answers a preflight request: 204 with allow headers, or 403.
    #[must_use]
    pub fn preflight(&self, headers: &HeaderMap) -> HttpResponse {
        let Some(origin) = headers.get(header::ORIGIN) else {
            return Self::forbidden("Missing Origin header");
        };
        let Ok(origin_str) = origin.to_str() else {
            return Self::forbidden("Disallowed CORS origin");
        };
        if !self.origins.is_allowed(origin_str) {
            return Self::forbidden("Disallowed CORS origin");
        }

        let requested_method = headers
            .get(header::ACCESS_CONTROL_REQUEST_METHOD)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<Method>().ok());
        match requested_method {
            Some(method) if self.methods.contains(&method) => {}
            _ => return Self::forbidden("Disallowed CORS method"),
        }

        let requested_headers = headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS);
        if let (AllowedHeaders::List(allowed), Some(requested)) = (&self.headers, requested_headers) {
            let requested = requested.to_str().unwrap_or_default();
            let disallowed = requested
                .split(',')
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .any(|h| !allowed.contains(&h));
            if disallowed {
                return Self::forbidden("Disallowed CORS headers");
            }
        }

        let mut response = response::empty(StatusCode::NO_CONTENT);
        let out = response.headers_mut();
        self.insert_origin_headers(origin, out);

        if let Ok(value) = HeaderValue::from_str(&join(self.methods.iter().map(Method::as_str))) {
            out.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
        }

        match (&self.headers, requested_headers) {
            (AllowedHeaders::Any, Some(requested)) => {
                out.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            }
            (AllowedHeaders::Any, None) => {}
            (AllowedHeaders::List(allowed), _) => {
                let mut names: Vec<&str> = allowed.iter().map(String::as_str).collect();
                names.sort_unstable();
                if let Ok(value) = HeaderValue::from_str(&join(names)) {
                    out.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
                }
            }
        }

        if let Some(max_age) = self.max_age {
            out.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age.as_secs()));
        }

        response
    }

    /// Adds CORS headers to a non-preflight response.
    ///
    /// Does nothing when the request had no `Origin` or it is not allowed.
    pub fn apply(&self, request_origin: Option<&HeaderValue>, response: &mut HttpResponse) {
        let Some(origin) = request_origin else {
            return;
        };
        let allowed = origin
            .to_str()
            .map(|o| self.origins.is_allowed(o))
            .unwrap_or(false);
        if !allowed {
            return;
        }

        let out = response.headers_mut();
        self.insert_origin_headers(origin, out);

        if !self.expose_headers.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&join(self.expose_headers.iter().map(String::as_str))) {
                out.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, value);
            }
        }
    }

    fn insert_origin_headers(&self, origin: &HeaderValue, out: &mut HeaderMap) {
        let echo = !matches!(self.origins, AllowedOrigins::Any) || self.allow_credentials;
        if echo {
            out.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            out.append(header::VARY, HeaderValue::from_static("Origin"));
        } else {
            out.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        }

        if self.allow_credentials {
            out.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }

    fn forbidden(reason: &str) -> HttpResponse {
        tracing::debug!(reason, "CORS preflight rejected");
        let mut response = response::error(&HestiaError::bad_request(reason));
        *response.status_mut() = StatusCode::FORBIDDEN;
        response
    }
}

fn join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().collect::<Vec<_>>().join(", ")
}

/// Builder for [`Cors`].
#[derive(Debug, Clone)]
pub struct CorsBuilder {
    cors: Cors,
}

impl CorsBuilder {
    /// Creates a builder allowing no origins, the common methods, and
    /// `content-type`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cors: Cors {
                origins: AllowedOrigins::List(HashSet::new()),
                methods: vec![
                    Method::GET,
                    Method::HEAD,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                ],
                headers: AllowedHeaders::List(HashSet::from(["content-type".to_string()])),
                expose_headers: vec!["x-request-id".to_string()],
                allow_credentials: false,
                max_age: Some(Duration::from_secs(600)),
            },
        }
    }

    /// Allows any origin.
    #[must_use]
    pub fn allow_any_origin(mut self) -> Self {
        self.cors.origins = AllowedOrigins::Any;
        self
    }

    /// Adds an allowed origin. `"*"` switches to any origin.
    #[must_use]
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        if origin == "*" {
            self.cors.origins = AllowedOrigins::Any;
        } else if let AllowedOrigins::List(origins) = &mut self.cors.origins {
            origins.insert(origin);
        }
        self
    }

    /// Adds each origin in turn (see [`CorsBuilder::allow_origin`]).
    #[must_use]
    pub fn allow_origins<I, S>(self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        origins
            .into_iter()
            .fold(self, |builder, origin| builder.allow_origin(origin))
    }

    /// Sets the allowed methods.
    #[must_use]
    pub fn allow_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.cors.methods.clear();
        for method in methods {
            if !self.cors.methods.contains(&method) {
                self.cors.methods.push(method);
            }
        }
        self
    }

    /// Allows any request header.
    #[must_use]
    pub fn allow_any_header(mut self) -> Self {
        self.cors.headers = AllowedHeaders::Any;
        self
    }

    /// Sets the allowed request headers. A `"*"` entry allows any header.
    #[must_use]
    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: HashSet<String> = headers
            .into_iter()
            .map(|h| h.into().to_ascii_lowercase())
            .collect();
        self.cors.headers = if headers.contains("*") {
            AllowedHeaders::Any
        } else {
            AllowedHeaders::List(headers)
        };
        self
    }

    /// Sets the response headers exposed to scripts.
    #[must_use]
    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors.expose_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether credentials are allowed.
    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.cors.allow_credentials = allow;
        self
    }

    /// Sets the preflight cache duration.
    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.cors.max_age = Some(max_age);
        self
    }

    /// Builds the policy.
    #[must_use]
    pub fn build(self) -> Cors {
        self.cors
    }
}

impl Default for CorsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preflight_headers(origin: &str, method: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_str(origin).unwrap());
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_str(method).unwrap(),
        );
        headers
    }

    #[test]
    fn test_is_preflight() {
        let headers = preflight_headers("https://a.test", "POST");
        assert!(Cors::is_preflight(&Method::OPTIONS, &headers));
        assert!(!Cors::is_preflight(&Method::GET, &headers));
        assert!(!Cors::is_preflight(&Method::OPTIONS, &HeaderMap::new()));
    }

    #[test]
    fn test_permissive_preflight_echoes_origin() {
        let cors = Cors::permissive();
        let mut headers = preflight_headers("https://a.test", "PUT");
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("content-type, x-custom"),
        );

        let response = cors.preflight(&headers);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let out = response.headers();
        assert_eq!(out[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://a.test");
        assert_eq!(out[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(out[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type, x-custom");
        assert_eq!(out[header::VARY], "Origin");
        assert!(out[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .contains("PUT"));
    }

    #[test]
    fn test_wildcard_without_credentials_uses_star() {
        let cors = Cors::builder().allow_any_origin().build();
        let mut response = response::empty(StatusCode::OK);
        cors.apply(Some(&HeaderValue::from_static("https://a.test")), &mut response);

        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }

    #[test]
    fn test_disallowed_origin_rejected() {
        let cors = Cors::builder().allow_origin("https://good.test").build();
        let response = cors.preflight(&preflight_headers("https://bad.test", "GET"));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_disallowed_method_rejected() {
        let cors = Cors::builder()
            .allow_origin("https://good.test")
            .allow_methods([Method::GET])
            .build();
        let response = cors.preflight(&preflight_headers("https://good.test", "DELETE"));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_disallowed_header_rejected() {
        let cors = Cors::builder().allow_origin("https://good.test").build();
        let mut headers = preflight_headers("https://good.test", "GET");
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("authorization"),
        );
        assert_eq!(cors.preflight(&headers).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_apply_skips_missing_or_disallowed_origin() {
        let cors = Cors::builder().allow_origin("https://good.test").build();

        let mut response = response::empty(StatusCode::OK);
        cors.apply(None, &mut response);
        assert!(response.headers().is_empty());

        cors.apply(Some(&HeaderValue::from_static("https://bad.test")), &mut response);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_apply_exposes_request_id() {
        let cors = Cors::builder().allow_origin("https://good.test").build();
        let mut response = response::empty(StatusCode::OK);
        cors.apply(Some(&HeaderValue::from_static("https://good.test")), &mut response);

        let out = response.headers();
        assert_eq!(out[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://good.test");
        assert_eq!(out[header::ACCESS_CONTROL_EXPOSE_HEADERS], "x-request-id");
    }

    #[test]
    fn test_builder_star_entries() {
        let cors = Cors::builder()
            .allow_origins(["*"])
            .allow_headers(["*"])
            .build();
        assert!(cors.is_origin_allowed("https://anything.test"));
        assert_eq!(cors.headers, AllowedHeaders::Any);
    }
}
