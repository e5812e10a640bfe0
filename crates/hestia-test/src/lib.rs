//! # Hestia Test
//!
//! In-memory HTTP testing for Hestia servers. Requests are handed straight
//! to [`hestia_server::Server::handle`], so tests exercise routing, CORS,
//! body limits and handlers without binding a port.
//!
//! ## Example
//!
//! ```ignore
//! use hestia_test::TestClient;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_item() {
//!     let client = TestClient::new(app());
//!
//!     let response = client
//!         .post("/items")
//!         .json(&json!({"name": "Lamp", "price": 19.5}))
//!         .send()
//!         .await;
//!
//!     assert_eq!(response.status_code(), 201);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hestia-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
