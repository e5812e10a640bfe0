//! Test response wrapper.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// A fully read response with assertion helpers.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Reads an HTTP response to the end.
    ///
    /// # Errors
    ///
    /// Returns `TestError::BodyRead` if the body stream fails.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: http_body_util::BodyExt,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `TestError::BodyRead` if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `TestError::Json` if the body is not the expected JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `TestError::Json` if the body is not JSON.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status differs; the message includes the body.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {} with body {}",
            expected,
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("Header '{name}' not found"));
        assert_eq!(actual, expected.as_ref(), "Header '{name}' mismatch");
        self
    }

    /// Asserts the body is JSON equal to `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or differs.
    #[track_caller]
    pub fn assert_json(&self, expected: &serde_json::Value) -> &Self {
        let actual = self
            .json_value()
            .unwrap_or_else(|e| panic!("Body is not JSON ({e}): {}", String::from_utf8_lossy(&self.body)));
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts the body is empty.
    ///
    /// # Panics
    ///
    /// Panics if the body has any bytes.
    #[track_caller]
    pub fn assert_empty_body(&self) -> &Self {
        assert!(
            self.body.is_empty(),
            "Expected empty body, got {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use serde_json::json;

    async fn response(status: StatusCode, body: &'static str) -> TestResponse {
        let http = http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        TestResponse::from_http(http).await.unwrap()
    }

    #[tokio::test]
    async fn test_accessors() {
        let r = response(StatusCode::CREATED, r#"{"id":1}"#).await;
        assert_eq!(r.status_code(), 201);
        assert_eq!(r.content_type(), Some("application/json"));
        assert_eq!(r.text().unwrap(), r#"{"id":1}"#);
        assert_eq!(r.json_value().unwrap()["id"], 1);
    }

    #[tokio::test]
    async fn test_assertions_chain() {
        let r = response(StatusCode::OK, r#"{"detail":"x"}"#).await;
        r.assert_status(StatusCode::OK)
            .assert_header("content-type", "application/json")
            .assert_json(&json!({"detail": "x"}));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let r = response(StatusCode::NO_CONTENT, "").await;
        r.assert_empty_body();
        assert!(r.json_value().is_err());
    }

    #[tokio::test]
    #[should_panic(expected = "Expected status")]
    async fn test_assert_status_panics() {
        let r = response(StatusCode::NOT_FOUND, "{}").await;
        r.assert_status(StatusCode::OK);
    }
}
