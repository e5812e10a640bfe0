//! HTTP response construction.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use http_body_util::Full;

use hestia_core::HestiaError;

/// HTTP response body type.
pub type ResponseBody = Full<Bytes>;

/// HTTP response type produced by the server.
pub type HttpResponse = Response<ResponseBody>;

const APPLICATION_JSON: &str = "application/json";

/// Builds a response with a JSON body.
#[must_use]
pub fn json(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    response
}

/// Builds a response with no body.
#[must_use]
pub fn empty(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Builds a plain-text response.
#[must_use]
pub fn text(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Builds the `{"detail": ...}` response for an error.
#[must_use]
pub fn error(err: &HestiaError) -> HttpResponse {
    let body = serde_json::to_vec(&err.to_body())
        .unwrap_or_else(|_| br#"{"detail":"Internal Server Error"}"#.to_vec());
    json(err.status_code(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: HttpResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_sets_content_type() {
        let response = json(StatusCode::CREATED, r#"{"id":1}"#);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(body_string(response).await, r#"{"id":1}"#);
    }

    #[tokio::test]
    async fn test_empty_has_no_body() {
        let response = empty(StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert!(body_string(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = error(&HestiaError::not_found("Item no encontrado"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, r#"{"detail":"Item no encontrado"}"#);
    }

    #[tokio::test]
    async fn test_internal_error_hides_source() {
        let err = HestiaError::internal_with_source("db exploded", std::io::Error::other("disk"));
        let response = error(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(!body.contains("disk"));
        assert!(body.contains("Internal Server Error"));
    }
}
