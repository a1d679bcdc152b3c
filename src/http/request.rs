//! Request context handed to the router.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Carry method, path, query and body to handlers (read-only)
//! - Resolve the routing path from whichever field the transport populated
//! - Decode JSON bodies into typed validation errors
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `uri` is preferred over `path`: some transports only populate one

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{HeaderName, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::protocol::ApiError;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        Uuid::new_v4()
            .to_string()
            .parse()
            .ok()
            .map(RequestId::new)
    }
}

/// A request as seen by the router and handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Full request URI path, when the transport provides it.
    pub uri: Option<String>,
    /// Bare path, when the transport provides it.
    pub path: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            method,
            uri: Some(path.clone()),
            path: Some(path),
            query: HashMap::new(),
            body: None,
            request_id: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json(self, value: &serde_json::Value) -> Self {
        let encoded = value.to_string();
        self.with_body(encoded)
    }

    /// Path used for route matching: `uri`, then `path`, then `""`.
    pub fn request_path(&self) -> &str {
        self.uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .or(self.path.as_deref())
            .unwrap_or("")
    }

    /// Query parameter value, treating empty strings as absent.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Parse the body as JSON.
    ///
    /// Missing body → `No data provided`; undecodable body → `Invalid JSON format`.
    pub fn json_body(&self) -> Result<serde_json::Value, ApiError> {
        let body = self
            .body
            .as_ref()
            .filter(|body| !body.is_empty())
            .ok_or_else(|| ApiError::validation("No data provided"))?;
        serde_json::from_slice(body).map_err(|_| ApiError::validation("Invalid JSON format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_path_prefers_uri() {
        let mut request = RequestContext::new(Method::GET, "/api/nodes");
        request.path = Some("/ignored".into());
        assert_eq!(request.request_path(), "/api/nodes");

        request.uri = None;
        assert_eq!(request.request_path(), "/ignored");

        request.uri = Some(String::new());
        assert_eq!(request.request_path(), "/ignored");

        request.path = None;
        assert_eq!(request.request_path(), "");
    }

    #[test]
    fn test_query_param_empty_is_missing() {
        let request = RequestContext::new(Method::GET, "/api/nodes/default-parameters")
            .with_query("nodeFamily", "")
            .with_query("nodeType", "noise");
        assert_eq!(request.query_param("nodeFamily"), None);
        assert_eq!(request.query_param("nodeType"), Some("noise"));
    }

    #[test]
    fn test_json_body_errors() {
        let request = RequestContext::new(Method::POST, "/api/nodes");
        assert_eq!(request.json_body(), Err(ApiError::validation("No data provided")));

        let request = request.with_body("{not json");
        assert_eq!(request.json_body(), Err(ApiError::validation("Invalid JSON format")));

        let request = RequestContext::new(Method::POST, "/api/nodes").with_json(&json!({"nodeType": "noise"}));
        assert_eq!(request.json_body(), Ok(json!({"nodeType": "noise"})));
    }

    #[test]
    fn test_uuid_request_ids_are_unique() {
        let mut maker = UuidRequestId;
        let request = Request::builder().body(()).unwrap();
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
