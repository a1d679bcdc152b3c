//! Node graph endpoints.
//!
//! Every handler goes through the shared [`NodeStore`]; none of them keeps
//! state of its own between requests.

use std::sync::Arc;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::api::{captured_node_path, optional_index, optional_str, parse_parameters, reply, required_str};
use crate::graph::{serialize_named, GraphWalker, NodeRef, NodeStore, NodeSummary, NodeSummaryLight, StoreError};
use crate::http::{RequestContext, ResponseContext};
use crate::observability::metrics;
use crate::protocol::ApiError;
use crate::routing::{HandlerResult, PathCaptures, RequestHandler};

/// Name of the throwaway node used to read default parameters.
const PROBE_NODE_NAME: &str = "tempNode";

/// Project root, falling back to `/` when the host has none.
fn creation_root(store: &dyn NodeStore) -> NodeRef {
    store.project_root().unwrap_or_else(|| {
        tracing::warn!("Project root missing, using /");
        store.root()
    })
}

/// Full type name from the request's `nodeType` and `nodeFamily`.
fn op_type(node_type: &str, family: &str) -> String {
    format!("{}{}", node_type.to_lowercase(), family)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("Failed to encode response: {}", e)))
}

/// Compile a `*`/`?` glob into an anchored name matcher.
fn glob_to_regex(pattern: &str) -> Result<Regex, ApiError> {
    let mut source = String::with_capacity(pattern.len() + 2);
    source.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|e| ApiError::validation(format!("Invalid pattern '{}': {}", pattern, e)))
}

fn flag(request: &RequestContext, name: &str) -> bool {
    request
        .query_param(name)
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
}

/// `GET /api/nodes`
///
/// Without `parentPath` this returns the whole project tree as
/// `projectNodes`. With it, a single level under that parent, optionally
/// filtered by a `pattern` glob on child names.
pub struct ListNodesHandler {
    store: Arc<dyn NodeStore>,
}

impl ListNodesHandler {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    fn project_tree(&self) -> Result<Value, ApiError> {
        let store = self.store.as_ref();
        let root = creation_root(store);
        let walk = GraphWalker::new(store).walk(&root, &root.path);

        tracing::debug!(root = %root.path, nodes = walk.nodes.len(), visited = walk.visited.len(), "Project tree collected");
        metrics::record_walk(walk.visited.len());

        Ok(json!({ "projectNodes": to_json(&walk.nodes)? }))
    }

    fn children_of(&self, request: &RequestContext, parent_path: &str) -> Result<Value, ApiError> {
        let store = self.store.as_ref();
        let parent = store
            .find(parent_path)
            .ok_or_else(|| ApiError::not_found(format!("Parent node not found at path: {}", parent_path)))?;

        let matcher = match request.query_param("pattern").filter(|p| !p.is_empty()) {
            Some(pattern) => Some(glob_to_regex(pattern)?),
            None => None,
        };
        let children = store
            .list_children(&parent)
            .into_iter()
            .filter(|child| matcher.as_ref().is_none_or(|re| re.is_match(&child.name)));

        let nodes = if flag(request, "includeProperties") {
            children
                .map(|child| NodeSummary::detail(store, &child).to_value())
                .collect::<Vec<_>>()
        } else {
            children
                .map(|child| to_json(&NodeSummaryLight::from(&child)))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(json!({ "nodes": nodes }))
    }
}

impl RequestHandler for ListNodesHandler {
    fn process(&self, request: &RequestContext, response: &mut ResponseContext, _: &PathCaptures) -> HandlerResult {
        let body = match request.query_param("parentPath").filter(|p| !p.is_empty()) {
            Some(parent_path) => self.children_of(request, parent_path)?,
            None => self.project_tree()?,
        };
        reply(response, 200, body)
    }
}

/// `GET /api/nodes/default-parameters`
///
/// Creates a probe node, reads its parameters and deletes it again.
pub struct NodeDefaultParametersHandler {
    store: Arc<dyn NodeStore>,
}

impl NodeDefaultParametersHandler {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }
}

impl RequestHandler for NodeDefaultParametersHandler {
    fn process(&self, request: &RequestContext, response: &mut ResponseContext, _: &PathCaptures) -> HandlerResult {
        let family = request
            .query_param("nodeFamily")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::validation("Missing required query parameter: nodeFamily"))?;
        let node_type = request
            .query_param("nodeType")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::validation("Missing required query parameter: nodeType"))?;

        let store = self.store.as_ref();
        let parent = creation_root(store);
        let probe = store
            .create(&parent.path, &op_type(node_type, family), PROBE_NODE_NAME, &Map::new())
            .map_err(|e| ApiError::validation(format!("Error getting default parameters: {}", e)))?;

        let parameters = serialize_named(&store.parameters(&probe));

        if let Err(e) = store.delete(&probe.path) {
            tracing::warn!(path = %probe.path, error = %e, "Failed to remove probe node");
        }

        reply(response, 200, Value::Object(parameters))
    }
}

/// `GET /api/node-types`
pub struct NodeTypesHandler {
    store: Arc<dyn NodeStore>,
}

impl NodeTypesHandler {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }
}

impl RequestHandler for NodeTypesHandler {
    fn process(&self, _: &RequestContext, response: &mut ResponseContext, _: &PathCaptures) -> HandlerResult {
        let types = to_json(&self.store.node_types())?;
        reply(response, 200, json!({ "types": types }))
    }
}

/// `GET /api/nodes/{path}`
pub struct GetNodeHandler {
    store: Arc<dyn NodeStore>,
}

impl GetNodeHandler {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }
}

impl RequestHandler for GetNodeHandler {
    fn process(&self, _: &RequestContext, response: &mut ResponseContext, captures: &PathCaptures) -> HandlerResult {
        let path = captured_node_path(captures)?;
        let node = self
            .store
            .find(path)
            .ok_or_else(|| ApiError::not_found(format!("Node not found: {}", path)))?;

        let summary = NodeSummary::detail(self.store.as_ref(), &node);
        reply(response, 200, summary.to_value())
    }
}

/// `POST /api/nodes`
pub struct CreateNodeHandler {
    store: Arc<dyn NodeStore>,
}

impl CreateNodeHandler {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }
}

impl RequestHandler for CreateNodeHandler {
    fn process(&self, request: &RequestContext, response: &mut ResponseContext, _: &PathCaptures) -> HandlerResult {
        let body = request.json_body()?;
        let body = body
            .as_object()
            .ok_or_else(|| ApiError::validation("Request body must be a JSON object"))?;

        let family = required_str(body, "nodeFamily")?;
        let node_type = required_str(body, "nodeType")?;
        let name = optional_str(body, "nodeName")?;
        let parameters = parse_parameters(body.get("parameters"));

        let store = self.store.as_ref();
        let parent = creation_root(store);
        let node = store
            .create(&parent.path, &op_type(node_type, family), name, &parameters)
            .map_err(|e| ApiError::internal(format!("Error creating node: {}", e)))?;

        tracing::info!(path = %node.path, op_type = %node.op_type, "Node created");

        let summary = NodeSummary::detail(store, &node);
        reply(
            response,
            201,
            json!({
                "message": "Node created successfully",
                "node": summary.to_value(),
            }),
        )
    }
}

/// `PATCH /api/nodes/{path}`
///
/// Applies parameters one by one, then an optional connection. Parameters
/// already applied stay applied if the connection fails.
pub struct UpdateNodeHandler {
    store: Arc<dyn NodeStore>,
}

impl UpdateNodeHandler {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    fn connect(&self, connection: &Map<String, Value>) -> Result<(), ApiError> {
        let from_path = required_str(connection, "fromNodePath")?;
        let to_path = required_str(connection, "toNodePath")?;
        let out_index = optional_index(connection, "outIndex")?;
        let to_index = optional_index(connection, "toIndex")?;
        let clear_existing = connection
            .get("clearExisting")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let store = self.store.as_ref();
        let from = store
            .find(from_path)
            .ok_or_else(|| ApiError::not_found(format!("Source node not found: {}", from_path)))?;
        let to = store
            .find(to_path)
            .ok_or_else(|| ApiError::not_found(format!("Target node not found: {}", to_path)))?;

        store
            .connect(&from, out_index, &to, to_index, clear_existing)
            .map_err(|e| match e {
                StoreError::NotFound(_) | StoreError::InvalidRequest(_) => ApiError::from(e),
                other => ApiError::internal(format!("Error connecting nodes: {}", other)),
            })?;

        tracing::info!(from = %from.path, to = %to.path, "Nodes connected");
        Ok(())
    }
}

impl RequestHandler for UpdateNodeHandler {
    fn process(&self, request: &RequestContext, response: &mut ResponseContext, captures: &PathCaptures) -> HandlerResult {
        let path = captured_node_path(captures)?;
        let body = request.json_body()?;
        let body = body
            .as_object()
            .ok_or_else(|| ApiError::validation("Request body must be a JSON object"))?;

        let store = self.store.as_ref();
        let node = store
            .find(path)
            .ok_or_else(|| ApiError::not_found(format!("Node not found: {}", path)))?;

        let mut updated = Vec::new();
        let mut failed = Vec::new();
        for (name, value) in parse_parameters(body.get("parameters")) {
            match store.set_parameter(&node, &name, &value) {
                Ok(true) => updated.push(Value::String(name)),
                Ok(false) => failed.push(json!({ "name": name, "reason": "Parameter not found" })),
                Err(e) => failed.push(json!({ "name": name, "reason": e.to_string() })),
            }
        }

        match body.get("connection") {
            None | Some(Value::Null) => {}
            Some(Value::Object(connection)) => self.connect(connection)?,
            Some(_) => return Err(ApiError::validation("connection must be a JSON object")),
        }

        tracing::info!(path = %node.path, updated = updated.len(), failed = failed.len(), "Node updated");

        let summary = NodeSummary::detail(store, &node);
        reply(
            response,
            200,
            json!({
                "message": "Node updated successfully",
                "nodeInfo": summary.to_value(),
                "updated": updated,
                "failed": failed,
            }),
        )
    }
}

/// `DELETE /api/nodes/{path}`
pub struct DeleteNodeHandler {
    store: Arc<dyn NodeStore>,
}

impl DeleteNodeHandler {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }
}

impl RequestHandler for DeleteNodeHandler {
    fn process(&self, _: &RequestContext, response: &mut ResponseContext, captures: &PathCaptures) -> HandlerResult {
        let path = captured_node_path(captures)?;

        self.store.delete(path).map_err(|e| match e {
            StoreError::NotFound(_) | StoreError::InvalidRequest(_) => ApiError::from(e),
            other => ApiError::internal(format!("Error deleting node: {}", other)),
        })?;

        tracing::info!(path = %path, "Node deleted");
        reply(response, 200, json!({ "message": format!("Node {} deleted successfully", path) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_to_regex() {
        let re = glob_to_regex("noise*").unwrap();
        assert!(re.is_match("noise1"));
        assert!(re.is_match("noise"));
        assert!(!re.is_match("level1"));

        let re = glob_to_regex("geo?").unwrap();
        assert!(re.is_match("geo1"));
        assert!(!re.is_match("geo12"));

        let re = glob_to_regex("a.b").unwrap();
        assert!(re.is_match("a.b"));
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn test_op_type_lowercases_type_only() {
        assert_eq!(op_type("Noise", "TOP"), "noiseTOP");
        assert_eq!(op_type("container", "COMP"), "containerCOMP");
    }
}
