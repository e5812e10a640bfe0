//! Test client driving a [`Server`] in memory.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;

use hestia_server::Server;

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

/// Sends requests straight into [`Server::handle`], without sockets.
///
/// Requests go through the full pipeline: CORS, routing, body limits,
/// handlers, request IDs.
///
/// # Example
///
/// ```rust,ignore
/// use hestia_test::TestClient;
///
/// let client = TestClient::new(server);
/// let response = client.get("/items").send().await;
/// assert_eq!(response.status_code(), 200);
/// ```
#[must_use]
#[derive(Clone)]
pub struct TestClient {
    server: Arc<Server>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for a server.
    pub fn new(server: Server) -> Self {
        Self::from_arc(Arc::new(server))
    }

    /// Creates a client for a shared server.
    pub fn from_arc(server: Arc<Server>) -> Self {
        Self {
            server,
            default_headers: Vec::new(),
        }
    }

    /// Returns the server under test.
    #[must_use]
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Starts an OPTIONS request.
    pub fn options(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    async fn send_internal(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.server.handle(request.into_http_request()?).await;
        TestResponse::from_http(response).await
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("server", &self.server)
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the response cannot be
    /// read; use [`TestClientRequest::try_send`] to handle those cases.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request, returning build or read errors.
    ///
    /// # Errors
    ///
    /// Returns `TestError` if the request is invalid or the body cannot be
    /// read.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send_internal(request).await
    }
}
