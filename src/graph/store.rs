//! Host object store contract.
//!
//! The store owns the live node graph. Handlers and the walker only ever see
//! [`NodeRef`] snapshots and go back through the store for everything else.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::graph::value::HostValue;

/// Errors raised by a [`NodeStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Node not found: {0}")]
    NotFound(String),

    /// Invalid type, parent or name on create.
    #[error("{0}")]
    Creation(String),

    /// Request the store refuses outright (e.g. deleting the root).
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid value for parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("{0}")]
    Connection(String),
}

/// Snapshot handle of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub id: u64,
    pub name: String,
    /// Absolute path, e.g. `/project1/noise1`.
    pub path: String,
    /// Full type name, e.g. `noiseTOP`.
    pub op_type: String,
    /// Family suffix, e.g. `TOP`.
    pub family: String,
}

/// One end of a connection, seen from the other node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub node_path: String,
    /// Connector index on the peer node.
    pub index: usize,
}

/// Connections per connector, indexed by connector position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConnectors {
    pub inputs: Vec<Vec<Link>>,
    pub outputs: Vec<Vec<Link>>,
}

/// A creatable node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeInfo {
    pub family: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub op_type: String,
    pub inputs: usize,
    pub outputs: usize,
}

/// Capability surface of the host graph.
pub trait NodeStore: Send + Sync {
    /// The absolute root (`/`).
    fn root(&self) -> NodeRef;

    /// The project node that listings and creation start from.
    fn project_root(&self) -> Option<NodeRef>;

    fn find(&self, path: &str) -> Option<NodeRef>;

    /// Create a node of `type_name` (e.g. `noiseTOP`) under `parent_path`.
    ///
    /// An empty `name` lets the store pick one. Parameters that cannot be
    /// applied are logged and skipped.
    fn create(
        &self,
        parent_path: &str,
        type_name: &str,
        name: &str,
        parameters: &Map<String, Value>,
    ) -> Result<NodeRef, StoreError>;

    /// Delete a node and everything below it.
    fn delete(&self, path: &str) -> Result<bool, StoreError>;

    /// Returns `Ok(false)` when the node has no parameter called `name`.
    fn set_parameter(&self, node: &NodeRef, name: &str, value: &Value) -> Result<bool, StoreError>;

    fn list_children(&self, node: &NodeRef) -> Vec<NodeRef>;

    fn connect(
        &self,
        from: &NodeRef,
        out_index: usize,
        to: &NodeRef,
        in_index: usize,
        clear_existing: bool,
    ) -> Result<(), StoreError>;

    /// Parameters in host order.
    fn parameters(&self, node: &NodeRef) -> Vec<(String, HostValue)>;

    fn connectors(&self, node: &NodeRef) -> NodeConnectors;

    fn node_types(&self) -> Vec<NodeTypeInfo> {
        Vec::new()
    }
}
