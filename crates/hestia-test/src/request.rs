//! Test request building.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use http_body_util::Full;
use serde::Serialize;

use crate::error::TestError;

/// A request ready to be sent through a [`TestClient`](crate::TestClient).
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// HTTP method
    pub method: Method,
    /// Request URI
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Bytes,
}

impl TestRequest {
    /// Starts a GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Converts into an `http::Request` with a full body.
    ///
    /// # Errors
    ///
    /// Returns `TestError::RequestBuild` if the parts do not form a valid
    /// request.
    pub fn into_http_request(self) -> Result<Request<Full<Bytes>>, TestError> {
        let mut request = Request::builder()
            .method(self.method)
            .uri(self.uri)
            .body(Full::new(self.body))
            .map_err(|e| TestError::RequestBuild(e.to_string()))?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

/// Builder for [`TestRequest`].
///
/// Invalid headers or bodies are reported by [`TestRequestBuilder::build`]
/// rather than at the call that introduced them.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    /// Sets a header, replacing any earlier value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Some(Bytes::from(bytes)),
            Err(e) => self.fail(TestError::Json(e)),
        }
        self.content_type("application/json")
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building, or
    /// `TestError::RequestBuild` if the URI does not parse.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("Invalid URI: {e}")))?;

        Ok(TestRequest {
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        })
    }

    fn fail(&mut self, error: TestError) {
        self.error.get_or_insert(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_basic_request() {
        let request = TestRequest::get("/items/1").build().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.uri.path(), "/items/1");
        assert!(request.body.is_empty());
    }

    #[test]
    fn test_json_sets_body_and_content_type() {
        let request = TestRequest::post("/items")
            .json(&json!({"name": "Lamp", "price": 1.5}))
            .build()
            .unwrap();

        assert_eq!(request.headers[header::CONTENT_TYPE], "application/json");
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["name"], "Lamp");
    }

    #[test]
    fn test_invalid_header_reported_on_build() {
        let result = TestRequest::get("/").header("bad header", "x").build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[test]
    fn test_invalid_uri_reported_on_build() {
        let result = TestRequest::get("http://[::1").build();
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }

    #[test]
    fn test_into_http_request_keeps_headers() {
        let request = TestRequest::put("/items/2")
            .header("x-request-id", "abc")
            .body("raw")
            .build()
            .unwrap()
            .into_http_request()
            .unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.headers()["x-request-id"], "abc");
    }
}
