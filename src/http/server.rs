//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app with a single fallback dispatcher
//! - Wire up middleware (request ID, tracing, timeout)
//! - Convert HTTP requests into `RequestContext` and back
//! - Run the route dispatch on the blocking pool
//! - Serve until the shutdown broadcast fires

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::BridgeConfig;
use crate::http::request::{RequestContext, UuidRequestId, X_REQUEST_ID};
use crate::http::response::ResponseContext;
use crate::observability::tracing::request_span;
use crate::protocol::{ApiError, ErrorInfo};
use crate::routing::Router as ApiRouter;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ApiRouter>,
    pub max_body_size: usize,
}

/// HTTP server for the node API.
pub struct HttpServer {
    app: Router,
    config: BridgeConfig,
}

impl HttpServer {
    pub fn new(config: BridgeConfig, router: Arc<ApiRouter>) -> Self {
        let state = AppState {
            router,
            max_body_size: config.limits.max_body_size,
        };
        let app = Self::build_app(&config, state);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &BridgeConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(map_response(timeout_as_json))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The app as a tower service, for driving without a socket.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            server = %self.config.server.name,
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

/// Single entry point for every request.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    if !state.router.supports_method(&parts.method) {
        let error = ApiError::MethodNotSupported(format!("Method {} not supported", parts.method));
        tracing::warn!(method = %parts.method, path = %parts.uri.path(), "Method not supported");
        return error_response(&error.to_error_info());
    }

    let query = match Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        Ok(Query(query)) => query,
        Err(e) => {
            return error_response(&ApiError::validation(format!("Invalid query string: {}", e)).to_error_info());
        }
    };

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, limit = state.max_body_size, "Failed to read request body");
            return error_response(
                &ApiError::validation(format!("Failed to read request body: {}", e)).to_error_info(),
            );
        }
    };

    let request_id = parts
        .headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let path = parts.uri.path().to_string();
    let context = RequestContext {
        method: parts.method,
        uri: Some(path.clone()),
        path: Some(path),
        query,
        body: (!body.is_empty()).then_some(body),
        request_id,
    };

    let span = request_span(&context);
    let router = Arc::clone(&state.router);
    let joined = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let mut response = ResponseContext::new();
        let outcome = router.route_request(&context, &mut response);
        tracing::debug!(ok = outcome.is_ok(), status = response.status, "Request dispatched");
        response
    })
    .await;

    match joined {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            error_response(&ErrorInfo::internal("Request dispatch failed"))
        }
    }
}

/// `TimeoutLayer` answers with an empty 408; give it a JSON error body.
async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("Request timed out");
        return error_response(&ErrorInfo::new(408, "Request timed out"));
    }
    response
}

fn error_response(error: &ErrorInfo) -> Response {
    let mut response = ResponseContext::new();
    response.write_error(error);
    response.into_response()
}
