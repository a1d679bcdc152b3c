//! Server identity and placeholder data endpoints.

use serde_json::{json, Value};

use crate::api::reply;
use crate::http::{RequestContext, ResponseContext};
use crate::routing::{HandlerResult, PathCaptures, RequestHandler};

/// `GET /api/server`
pub struct ServerInfoHandler {
    server: String,
}

impl ServerInfoHandler {
    pub fn new(server: impl Into<String>) -> Self {
        Self { server: server.into() }
    }
}

impl RequestHandler for ServerInfoHandler {
    fn process(&self, _: &RequestContext, response: &mut ResponseContext, _: &PathCaptures) -> HandlerResult {
        reply(
            response,
            200,
            json!({
                "server": self.server,
                "version": env!("CARGO_PKG_VERSION"),
                "status": "running",
            }),
        )
    }
}

/// `GET /api/data`
pub fn get_data(_: &RequestContext, response: &mut ResponseContext, _: &PathCaptures) -> HandlerResult {
    reply(response, 200, Value::Object(Default::default()))
}

/// `POST /api/data`: accepts any JSON body.
pub fn send_data(request: &RequestContext, response: &mut ResponseContext, _: &PathCaptures) -> HandlerResult {
    let data = request.json_body()?;
    tracing::debug!(bytes = data.to_string().len(), "Data received");
    reply(response, 200, json!({ "message": "Data received successfully" }))
}
