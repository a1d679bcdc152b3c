//! Error taxonomy and HTTP status mapping.

use serde::Serialize;

use crate::graph::store::StoreError;

/// Reason phrase for a status code. Unknown codes map to `"Unknown"`.
pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Status and message of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub status: u16,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a 500 error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn reason(&self) -> &'static str {
        status_reason(self.status)
    }

    /// JSON error body written to the client.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.message })
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.reason(), self.message)
    }
}

/// Errors a request handler can terminate with.
///
/// `Validation` and `NotFound` are the expected outcomes of a malformed or
/// stale request. `Internal` covers host store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request field (400).
    #[error("{0}")]
    Validation(String),

    /// Unknown node or endpoint (404).
    #[error("{0}")]
    NotFound(String),

    /// Method has no routes at all (405).
    #[error("{0}")]
    MethodNotSupported(String),

    /// Anything unexpected (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotSupported(_) => 405,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.status(), self.to_string())
    }
}

impl From<ApiError> for ErrorInfo {
    fn from(err: ApiError) -> Self {
        err.to_error_info()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::InvalidRequest(_) => ApiError::Validation(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
