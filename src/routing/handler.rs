//! Request handler lifecycle.
//!
//! # Data Flow
//! ```text
//! handle()
//!     → pre_process   (validate, may fail early)
//!     → process       (endpoint logic, writes response)
//!     → post_process  (inspect or replace the returned value)
//!     ✗ any ApiError  → on_error (writes {"error": ...} with the error's status)
//! ```
//!
//! # Design Decisions
//! - Expected failures travel as typed `ApiError`s, never as panics
//! - Panics are not caught here; the router owns the single panic boundary

use serde_json::Value;

use crate::http::{RequestContext, ResponseContext};
use crate::protocol::ApiError;
use crate::routing::matcher::PathCaptures;

/// Handler outcome: the value to report, if any.
pub type HandlerResult = Result<Option<Value>, ApiError>;

/// A unit of endpoint logic.
pub trait RequestHandler: Send + Sync {
    /// Short type name used in logs and metrics.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn pre_process(&self, _request: &RequestContext, _response: &mut ResponseContext) -> Result<(), ApiError> {
        Ok(())
    }

    /// Endpoint logic. Writes status and body into `response` and returns
    /// the reported value.
    fn process(
        &self,
        request: &RequestContext,
        response: &mut ResponseContext,
        captures: &PathCaptures,
    ) -> HandlerResult;

    fn post_process(
        &self,
        _request: &RequestContext,
        _response: &mut ResponseContext,
        result: Option<Value>,
    ) -> Option<Value> {
        result
    }

    fn on_error(&self, error: &ApiError, request: &RequestContext, response: &mut ResponseContext) -> Option<Value> {
        let info = error.to_error_info();
        if info.status >= 500 {
            tracing::error!(
                handler = self.name(),
                path = request.request_path(),
                status = info.status,
                error = %info.message,
                "Handler failed"
            );
        } else {
            tracing::warn!(
                handler = self.name(),
                path = request.request_path(),
                status = info.status,
                error = %info.message,
                "Request rejected"
            );
        }
        response.write_error(&info);
        None
    }

    /// Run the full lifecycle.
    fn handle(
        &self,
        request: &RequestContext,
        response: &mut ResponseContext,
        captures: &PathCaptures,
    ) -> Option<Value> {
        let outcome = self
            .pre_process(request, response)
            .and_then(|()| self.process(request, response, captures));

        match outcome {
            Ok(result) => self.post_process(request, response, result),
            Err(error) => self.on_error(&error, request, response),
        }
    }
}

/// Adapts a plain function or closure into a [`RequestHandler`].
pub struct FnHandler<F> {
    name: String,
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&RequestContext, &mut ResponseContext, &PathCaptures) -> HandlerResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> RequestHandler for FnHandler<F>
where
    F: Fn(&RequestContext, &mut ResponseContext, &PathCaptures) -> HandlerResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(
        &self,
        request: &RequestContext,
        response: &mut ResponseContext,
        captures: &PathCaptures,
    ) -> HandlerResult {
        (self.func)(request, response, captures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records which lifecycle hooks ran.
    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<&'static str>>,
        fail_pre: bool,
    }

    impl Recording {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RequestHandler for Recording {
        fn pre_process(&self, _: &RequestContext, _: &mut ResponseContext) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push("pre");
            if self.fail_pre {
                return Err(ApiError::validation("Missing required parameter: nodeFamily"));
            }
            Ok(())
        }

        fn process(&self, _: &RequestContext, response: &mut ResponseContext, _: &PathCaptures) -> HandlerResult {
            self.calls.lock().unwrap().push("process");
            response.write_json(200, json!({"ok": true}));
            Ok(Some(json!({"ok": true})))
        }

        fn post_process(&self, _: &RequestContext, _: &mut ResponseContext, result: Option<Value>) -> Option<Value> {
            self.calls.lock().unwrap().push("post");
            result
        }
    }

    #[test]
    fn test_lifecycle_order() {
        let handler = Recording::default();
        let request = RequestContext::new(Method::GET, "/x");
        let mut response = ResponseContext::new();

        let result = handler.handle(&request, &mut response, &PathCaptures::default());
        assert_eq!(handler.calls(), vec!["pre", "process", "post"]);
        assert_eq!(result, Some(json!({"ok": true})));
        assert_eq!(handler.name(), "Recording");
    }

    #[test]
    fn test_pre_process_failure_skips_process() {
        let handler = Recording {
            fail_pre: true,
            ..Default::default()
        };
        let request = RequestContext::new(Method::POST, "/x");
        let mut response = ResponseContext::new();

        let result = handler.handle(&request, &mut response, &PathCaptures::default());
        assert_eq!(handler.calls(), vec!["pre"]);
        assert_eq!(result, None);
        assert_eq!(response.status, 400);
        assert_eq!(response.body, json!({"error": "Missing required parameter: nodeFamily"}));
    }

    #[test]
    fn test_fn_handler() {
        let handler = FnHandler::new("echo", |request: &RequestContext, response: &mut ResponseContext, _: &PathCaptures| {
            let body = request.json_body()?;
            response.write_json(200, body.clone());
            Ok(Some(body))
        });
        assert_eq!(handler.name(), "echo");

        let request = RequestContext::new(Method::POST, "/echo").with_json(&json!({"a": 1}));
        let mut response = ResponseContext::new();
        assert_eq!(handler.handle(&request, &mut response, &PathCaptures::default()), Some(json!({"a": 1})));

        let request = RequestContext::new(Method::POST, "/echo");
        let mut response = ResponseContext::new();
        assert_eq!(handler.handle(&request, &mut response, &PathCaptures::default()), None);
        assert_eq!(response.body, json!({"error": "No data provided"}));
    }
}
