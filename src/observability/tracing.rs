//! Per-request spans.
//!
//! # Responsibilities
//! - Create one span per dispatched request
//! - Attach the request ID so every event inside carries it

use tracing::Span;

use crate::http::RequestContext;

pub fn request_span(request: &RequestContext) -> Span {
    tracing::info_span!(
        "request",
        request_id = request.request_id.as_deref().unwrap_or("unknown"),
        method = %request.method,
        path = request.request_path(),
    )
}
