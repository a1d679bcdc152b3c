//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes per method, in registration order
//! - Look up the first route whose pattern matches the request path
//! - Run the handler lifecycle behind a single panic boundary
//! - Report every dispatch as an `ApiResult`
//!
//! # Design Decisions
//! - Immutable after startup (shared behind `Arc` without locks)
//! - O(1) method lookup via HashMap, O(n) pattern scan per method
//! - First match wins; duplicate patterns are legal and the earlier one shadows
//! - Explicit 404 failure rather than a silent default

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use serde_json::Value;

use crate::http::response::JSON_CONTENT_TYPE;
use crate::http::{RequestContext, ResponseContext};
use crate::observability::metrics;
use crate::protocol::{ApiResult, ErrorInfo};
use crate::routing::handler::{FnHandler, HandlerResult, RequestHandler};
use crate::routing::matcher::{PathCaptures, PathPattern};

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A registered (method, pattern, handler) triple.
pub struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Arc<dyn RequestHandler>,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Result of a successful route lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub captures: PathCaptures,
}

#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` requests whose path matches `pattern`.
    pub fn add_route<H>(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), RouterError>
    where
        H: RequestHandler + 'static,
    {
        self.add_shared_route(method, pattern, Arc::new(handler))
    }

    pub fn add_shared_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), RouterError> {
        let compiled = PathPattern::new(pattern).map_err(|source| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        tracing::info!(
            method = %method,
            pattern = %pattern,
            handler = handler.name(),
            "Route registered"
        );

        self.routes.entry(method.clone()).or_default().push(Route {
            method,
            pattern: compiled,
            handler,
        });
        Ok(())
    }

    /// Register a plain function or closure as a handler.
    pub fn add_fn_route<F>(
        &mut self,
        method: Method,
        pattern: &str,
        name: &str,
        func: F,
    ) -> Result<(), RouterError>
    where
        F: Fn(&RequestContext, &mut ResponseContext, &PathCaptures) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_route(method, pattern, FnHandler::new(name, func))
    }

    /// First route registered for `method` whose pattern matches `path`.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.get(method)?.iter().find_map(|route| {
            route
                .pattern
                .captures(path)
                .map(|captures| RouteMatch { route, captures })
        })
    }

    pub fn supports_method(&self, method: &Method) -> bool {
        self.routes.get(method).is_some_and(|routes| !routes.is_empty())
    }

    pub fn routes(&self, method: &Method) -> &[Route] {
        self.routes.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Dispatch `request`, writing the outcome into `response`.
    pub fn route_request(&self, request: &RequestContext, response: &mut ResponseContext) -> ApiResult<Value> {
        let start = Instant::now();
        let method = request.method.as_str();
        let path = request.request_path();
        response.content_type = JSON_CONTENT_TYPE.to_string();

        let Some(matched) = self.match_route(&request.method, path) else {
            let error = ErrorInfo::new(404, format!("Unknown endpoint: {}", path));
            tracing::warn!(method = %method, path = %path, "No route matched");
            response.write_error(&error);
            metrics::record_request(method, error.status, "none", start);
            return ApiResult::failure(error);
        };

        let route = matched.route;
        let handler = route.handler();
        tracing::debug!(
            method = %method,
            path = %path,
            pattern = route.pattern(),
            handler = handler.name(),
            "Dispatching request"
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.handle(request, response, &matched.captures)
        }));

        let result = match outcome {
            Ok(value) => match response.error_info() {
                Some(error) => ApiResult::failure(error),
                None => ApiResult::success(value.unwrap_or(Value::Null)),
            },
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    method = %method,
                    path = %path,
                    handler = handler.name(),
                    error = %message,
                    "Handler panicked"
                );
                let error = ErrorInfo::internal(message);
                response.write_error(&error);
                ApiResult::failure(error)
            }
        };

        metrics::record_request(method, response.status, route.pattern(), start);
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ApiError;
    use serde_json::json;

    fn reply(
        tag: &'static str,
    ) -> impl Fn(&RequestContext, &mut ResponseContext, &PathCaptures) -> HandlerResult + Send + Sync + 'static {
        move |_: &RequestContext, response: &mut ResponseContext, _: &PathCaptures| {
            response.write_json(200, json!({ "handler": tag }));
            Ok(Some(json!({ "handler": tag })))
        }
    }

    fn dispatch(router: &Router, method: Method, path: &str) -> (ApiResult<Value>, ResponseContext) {
        let request = RequestContext::new(method, path);
        let mut response = ResponseContext::new();
        let result = router.route_request(&request, &mut response);
        (result, response)
    }

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new();
        router.add_fn_route(Method::GET, "/api/nodes", "broad", reply("broad")).unwrap();
        router.add_fn_route(Method::GET, "^/api/nodes$", "exact", reply("exact")).unwrap();

        let (result, _) = dispatch(&router, Method::GET, "/api/nodes");
        assert_eq!(result.value(), Some(&json!({"handler": "broad"})));
    }

    #[test]
    fn test_list_route_registered_before_detail_route() {
        let mut router = Router::new();
        router.add_fn_route(Method::GET, "^/api/nodes$", "list", reply("list")).unwrap();
        router.add_fn_route(Method::GET, "^/api/nodes(/.*)?$", "detail", reply("detail")).unwrap();

        let (result, _) = dispatch(&router, Method::GET, "/api/nodes");
        assert_eq!(result.value(), Some(&json!({"handler": "list"})));

        let (result, _) = dispatch(&router, Method::GET, "/api/nodes/project1/noise1");
        assert_eq!(result.value(), Some(&json!({"handler": "detail"})));
    }

    #[test]
    fn test_captures_reach_handler() {
        let mut router = Router::new();
        router
            .add_fn_route(Method::GET, "^/api/nodes(/.*)?$", "detail", |_: &RequestContext, _: &mut ResponseContext, captures: &PathCaptures| {
                Ok(Some(json!(captures.first())))
            })
            .unwrap();

        let (result, _) = dispatch(&router, Method::GET, "/api/nodes/project1");
        assert_eq!(result.value(), Some(&json!("/project1")));
    }

    #[test]
    fn test_unknown_endpoint() {
        let mut router = Router::new();
        router.add_fn_route(Method::GET, "^/api/server$", "server", reply("server")).unwrap();

        let (result, response) = dispatch(&router, Method::GET, "/api/missing");
        let error = result.error().unwrap();
        assert_eq!(error.status, 404);
        assert!(error.message.contains("/api/missing"));
        assert_eq!(response.body, json!({"error": "Unknown endpoint: /api/missing"}));

        let (result, _) = dispatch(&router, Method::POST, "/api/server");
        assert_eq!(result.error().map(|e| e.status), Some(404));
    }

    #[test]
    fn test_handler_error_becomes_failure() {
        let mut router = Router::new();
        router
            .add_fn_route(Method::POST, "^/api/nodes$", "create", |_: &RequestContext, _: &mut ResponseContext, _: &PathCaptures| {
                Err(ApiError::validation("Missing required parameter: nodeFamily"))
            })
            .unwrap();

        let (result, response) = dispatch(&router, Method::POST, "/api/nodes");
        assert_eq!(result.error(), Some(&ErrorInfo::new(400, "Missing required parameter: nodeFamily")));
        assert_eq!(response.status, 400);
        assert_eq!(response.reason, "Bad Request");
    }

    #[test]
    fn test_panic_becomes_internal_error() {
        let mut router = Router::new();
        router
            .add_fn_route(Method::GET, "^/boom$", "boom", |_: &RequestContext, _: &mut ResponseContext, _: &PathCaptures| -> HandlerResult {
                panic!("host object vanished")
            })
            .unwrap();

        let (result, response) = dispatch(&router, Method::GET, "/boom");
        assert_eq!(result.error(), Some(&ErrorInfo::internal("host object vanished")));
        assert_eq!(response.status, 500);
        assert_eq!(response.body, json!({"error": "host object vanished"}));
    }

    #[test]
    fn test_none_value_is_null_success() {
        let mut router = Router::new();
        router
            .add_fn_route(Method::DELETE, "^/x$", "noop", |_: &RequestContext, _: &mut ResponseContext, _: &PathCaptures| Ok(None))
            .unwrap();

        let (result, response) = dispatch(&router, Method::DELETE, "/x");
        assert_eq!(result.value(), Some(&Value::Null));
        assert_eq!(response.content_type, JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_uri_preferred_over_path() {
        let mut router = Router::new();
        router.add_fn_route(Method::GET, "^/api/server$", "server", reply("server")).unwrap();

        let mut request = RequestContext::new(Method::GET, "/api/server");
        request.path = Some("/elsewhere".into());
        let mut response = ResponseContext::new();
        assert!(router.route_request(&request, &mut response).is_ok());

        request.uri = None;
        let mut response = ResponseContext::new();
        assert!(!router.route_request(&request, &mut response).is_ok());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut router = Router::new();
        let err = router.add_fn_route(Method::GET, "^/api/(", "bad", reply("bad")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid route pattern '^/api/('"));
        assert_eq!(router.route_count(), 0);
    }

    #[test]
    fn test_supports_method() {
        let mut router = Router::new();
        router.add_fn_route(Method::GET, "^/a$", "a", reply("a")).unwrap();
        assert!(router.supports_method(&Method::GET));
        assert!(!router.supports_method(&Method::PUT));
        assert_eq!(router.routes(&Method::GET)[0].pattern(), "^/a$");
    }
}
