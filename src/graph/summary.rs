//! Client-facing node summaries.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::graph::serializer::serialize_named;
use crate::graph::store::{Link, NodeRef, NodeStore};

/// A single connection as reported on one connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    /// Connector index on the peer node.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Connections on one connector. Empty connectors are not reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorSummary {
    pub index: usize,
    pub connections: Vec<ConnectionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub op_type: String,
    pub family: String,
    pub parameters: Map<String, Value>,
    pub input_connections: Vec<ConnectorSummary>,
    pub output_connections: Vec<ConnectorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeSummary>>,
}

/// Cheap listing entry without parameters, connectors or children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummaryLight {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub op_type: String,
    pub family: String,
}

impl From<&NodeRef> for NodeSummaryLight {
    fn from(node: &NodeRef) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            path: node.path.clone(),
            op_type: node.op_type.clone(),
            family: node.family.clone(),
        }
    }
}

impl NodeSummary {
    /// Full detail for `node`: serialized parameters plus connectors.
    pub fn detail(store: &dyn NodeStore, node: &NodeRef) -> Self {
        let parameters = serialize_named(&store.parameters(node));
        let connectors = store.connectors(node);

        Self {
            id: node.id,
            name: node.name.clone(),
            path: node.path.clone(),
            op_type: node.op_type.clone(),
            family: node.family.clone(),
            parameters,
            input_connections: summarize(&connectors.inputs, Direction::Input),
            output_connections: summarize(&connectors.outputs, Direction::Output),
            children: None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| Value::String(format!("<error: {}>", e)))
    }
}

enum Direction {
    Input,
    Output,
}

fn summarize(connectors: &[Vec<Link>], direction: Direction) -> Vec<ConnectorSummary> {
    connectors
        .iter()
        .enumerate()
        .filter(|(_, links)| !links.is_empty())
        .map(|(index, links)| ConnectorSummary {
            index,
            connections: links
                .iter()
                .map(|link| match direction {
                    Direction::Input => ConnectionSummary {
                        index: link.index,
                        from: Some(link.node_path.clone()),
                        to: None,
                    },
                    Direction::Output => ConnectionSummary {
                        index: link.index,
                        from: None,
                        to: Some(link.node_path.clone()),
                    },
                })
                .collect(),
        })
        .collect()
}
