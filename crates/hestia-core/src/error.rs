//! Error types for Hestia.
//!
//! [`HestiaError`] is the single error type handlers return. Every variant
//! maps to an HTTP status through its [`ErrorCategory`] and renders as a
//! `{"detail": ...}` body: a plain message for most errors, or a list of
//! [`FieldError`]s for validation failures.
//!
//! ```
//! use hestia_core::{FieldErrors, HestiaError};
//!
//! let mut errors = FieldErrors::new();
//! errors.missing(["body", "price"]);
//!
//! let err = HestiaError::validation(errors);
//! assert_eq!(err.status_code().as_u16(), 422);
//! ```

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`HestiaError`].
pub type HestiaResult<T> = Result<T, HestiaError>;

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request body or path failed validation.
    Validation,
    /// Request could not be read.
    BadRequest,
    /// Resource or route not found.
    NotFound,
    /// Route exists but not for this method.
    MethodNotAllowed,
    /// Request body exceeds the configured limit.
    PayloadTooLarge,
    /// Client took too long to send the request.
    RequestTimeout,
    /// Handler took too long to respond.
    Timeout,
    /// Route has no handler bound to it.
    NotImplemented,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Hestia handlers and the server.
#[derive(Error, Debug)]
pub enum HestiaError {
    /// Request validation failed.
    #[error("Validation error: {} invalid field(s)", .field_errors.len())]
    Validation {
        /// Per-field failures, in the order they were detected.
        field_errors: FieldErrors,
    },

    /// Request could not be read.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message, sent to the client verbatim.
        message: String,
        /// The identifier of the resource, if any.
        resource_id: Option<String>,
    },

    /// Method not allowed on an existing route.
    #[error("Method not allowed: {message}")]
    MethodNotAllowed {
        /// Human-readable error message.
        message: String,
    },

    /// Request body too large.
    #[error("Payload too large: limit is {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Client did not finish sending the request in time.
    #[error("Request timeout: {message}")]
    RequestTimeout {
        /// Human-readable error message.
        message: String,
    },

    /// Handler did not finish in time.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// No handler bound to the matched operation.
    #[error("Not implemented: {operation_id}")]
    NotImplemented {
        /// The operation that has no handler.
        operation_id: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HestiaError {
    /// Creates a validation error from field failures.
    #[must_use]
    pub fn validation(field_errors: FieldErrors) -> Self {
        Self::Validation { field_errors }
    }

    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_id: None,
        }
    }

    /// Creates a not found error that remembers which resource was missing.
    #[must_use]
    pub fn not_found_resource(message: impl Into<String>, resource_id: impl ToString) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_id: Some(resource_id.to_string()),
        }
    }

    /// Creates a method not allowed error.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::MethodNotAllowed {
            message: "Method Not Allowed".to_string(),
        }
    }

    /// Creates a payload too large error.
    #[must_use]
    pub const fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge { limit }
    }

    /// Creates a request timeout error.
    #[must_use]
    pub fn request_timeout(message: impl Into<String>) -> Self {
        Self::RequestTimeout {
            message: message.into(),
        }
    }

    /// Creates a handler timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a not implemented error for an operation.
    #[must_use]
    pub fn not_implemented(operation_id: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation_id: operation_id.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::BadRequest { .. } => ErrorCategory::BadRequest,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::PayloadTooLarge { .. } => ErrorCategory::PayloadTooLarge,
            Self::RequestTimeout { .. } => ErrorCategory::RequestTimeout,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::NotImplemented { .. } => ErrorCategory::NotImplemented,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to the body sent to clients.
    ///
    /// Internal error sources are never included.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let detail = match self {
            Self::Validation { field_errors } => ErrorDetail::Fields(field_errors.0.clone()),
            Self::BadRequest { message }
            | Self::NotFound { message, .. }
            | Self::MethodNotAllowed { message }
            | Self::RequestTimeout { message }
            | Self::Timeout { message } => ErrorDetail::Message(message.clone()),
            Self::PayloadTooLarge { .. } => ErrorDetail::Message("Payload Too Large".to_string()),
            Self::NotImplemented { .. } => ErrorDetail::Message("Not Implemented".to_string()),
            Self::Internal { .. } => ErrorDetail::Message("Internal Server Error".to_string()),
        };
        ErrorBody { detail }
    }
}

/// A single field validation failure.
///
/// `loc` is the path to the offending value, starting with where it came
/// from (`"body"` or `"path"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Machine-readable failure kind (e.g. `missing`, `float_parsing`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Location of the offending value.
    pub loc: Vec<String>,
    /// Human-readable message.
    pub msg: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new<I, S>(kind: impl Into<String>, loc: I, msg: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
        }
    }
}

/// Ordered collection of [`FieldError`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Records a required value that was absent.
    pub fn missing<I, S>(&mut self, loc: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(FieldError::new("missing", loc, "Field required"));
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of field errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the errors in detection order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Returns `Ok(())` when empty, or a validation error carrying these failures.
    pub fn into_result(self) -> HestiaResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HestiaError::validation(self))
        }
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

/// Body sent to clients for every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// A message, or the list of validation failures.
    pub detail: ErrorDetail,
}

/// The `detail` member of an [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Human-readable message.
    Message(String),
    /// Validation failures.
    Fields(Vec<FieldError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_body_is_message() {
        let error = HestiaError::not_found_resource("Item no encontrado", 4);
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);

        let json = serde_json::to_value(error.to_body()).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "Item no encontrado"}));
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.missing(["body", "name"]);
        errors.push(FieldError::new(
            "float_parsing",
            ["body", "price"],
            "Input should be a valid number",
        ));

        let error = HestiaError::validation(errors);
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(error.to_string().contains("2 invalid field(s)"));

        let json = serde_json::to_value(error.to_body()).unwrap();
        assert_eq!(json["detail"][0]["type"], "missing");
        assert_eq!(json["detail"][0]["loc"], serde_json::json!(["body", "name"]));
        assert_eq!(json["detail"][1]["msg"], "Input should be a valid number");
    }

    #[test]
    fn test_internal_body_hides_source() {
        let error = HestiaError::internal_with_source(
            "encoding failed",
            std::io::Error::other("disk secret"),
        );
        assert!(std::error::Error::source(&error).is_some());

        let json = serde_json::to_string(&error.to_body()).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("Internal Server Error"));
    }

    #[test]
    fn test_field_errors_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());

        let errors = FieldErrors::from(FieldError::new("int_parsing", ["path", "item_id"], "bad"));
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_error_body_roundtrip_untagged() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"Not Found"}"#).unwrap();
        assert_eq!(body.detail, ErrorDetail::Message("Not Found".to_string()));
    }

    #[test]
    fn test_all_error_categories_have_status_codes() {
        let categories = [
            ErrorCategory::Validation,
            ErrorCategory::BadRequest,
            ErrorCategory::NotFound,
            ErrorCategory::MethodNotAllowed,
            ErrorCategory::PayloadTooLarge,
            ErrorCategory::RequestTimeout,
            ErrorCategory::Timeout,
            ErrorCategory::NotImplemented,
            ErrorCategory::Internal,
        ];

        for category in categories {
            let status = category.default_status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "Category {:?} should map to error status code, got {}",
                category,
                status
            );
        }
    }
}
