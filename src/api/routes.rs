//! Route table.
//!
//! Registration order matters: the literal `/api/nodes` and
//! `/api/nodes/default-parameters` routes must precede the
//! `/api/nodes(/.*)?` catch-all.

use std::sync::Arc;

use axum::http::Method;

use crate::api::info::{get_data, send_data, ServerInfoHandler};
use crate::api::nodes::{
    CreateNodeHandler, DeleteNodeHandler, GetNodeHandler, ListNodesHandler, NodeDefaultParametersHandler,
    NodeTypesHandler, UpdateNodeHandler,
};
use crate::graph::NodeStore;
use crate::routing::{Router, RouterError};

const NODE_PATH: &str = r"^/api/nodes(/.*)?$";

/// Build the router serving the node API over `store`.
pub fn build_api_router(store: Arc<dyn NodeStore>, server_name: &str) -> Result<Router, RouterError> {
    let mut router = Router::new();

    router.add_route(Method::GET, r"^/api/server$", ServerInfoHandler::new(server_name))?;
    router.add_fn_route(Method::GET, r"^/api/data$", "GetDataHandler", get_data)?;
    router.add_route(Method::GET, r"^/api/nodes$", ListNodesHandler::new(store.clone()))?;
    router.add_route(
        Method::GET,
        r"^/api/nodes/default-parameters$",
        NodeDefaultParametersHandler::new(store.clone()),
    )?;
    router.add_route(Method::GET, r"^/api/node-types$", NodeTypesHandler::new(store.clone()))?;
    router.add_route(Method::GET, NODE_PATH, GetNodeHandler::new(store.clone()))?;

    router.add_fn_route(Method::POST, r"^/api/data$", "SendDataHandler", send_data)?;
    router.add_route(Method::POST, r"^/api/nodes$", CreateNodeHandler::new(store.clone()))?;

    router.add_route(Method::PATCH, NODE_PATH, UpdateNodeHandler::new(store.clone()))?;
    router.add_route(Method::DELETE, NODE_PATH, DeleteNodeHandler::new(store))?;

    tracing::info!(routes = router.route_count(), "API routes registered");
    Ok(router)
}
