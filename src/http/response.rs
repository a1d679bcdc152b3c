//! Response context written by handlers.
//!
//! # Responsibilities
//! - Hold status, reason, JSON body and content type for one request
//! - Overwrite every field on the error path (never partially written)
//! - Encode into an axum response at the transport boundary

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::protocol::{status_reason, ErrorInfo};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Mutable response state for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContext {
    pub status: u16,
    pub reason: String,
    pub body: Value,
    pub content_type: String,
}

impl Default for ResponseContext {
    fn default() -> Self {
        Self {
            status: 200,
            reason: status_reason(200).to_string(),
            body: Value::Object(Default::default()),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }
}

impl ResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a JSON body with the given status.
    pub fn write_json(&mut self, status: u16, body: Value) {
        self.status = status;
        self.reason = status_reason(status).to_string();
        self.body = body;
        self.content_type = JSON_CONTENT_TYPE.to_string();
    }

    /// Replace the whole response with `{"error": message}`.
    pub fn write_error(&mut self, error: &ErrorInfo) {
        self.write_json(error.status, error.body());
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// The error currently written, if any.
    pub fn error_info(&self) -> Option<ErrorInfo> {
        if !self.is_error() {
            return None;
        }
        let message = match self.body.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => self.reason.clone(),
        };
        Some(ErrorInfo::new(self.status, message))
    }

    /// Encoded body text.
    pub fn encoded_body(&self) -> String {
        self.body.to_string()
    }
}

impl IntoResponse for ResponseContext {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(JSON_CONTENT_TYPE));

        let mut response = Response::new(Body::from(self.encoded_body()));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
        response
    }
}
