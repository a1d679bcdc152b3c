//! Recursive, cycle-safe node tree collection.
//!
//! # Design Decisions
//! - Visited set keyed by absolute node path, allocated per walk
//! - First visit wins: a node reachable twice is silently dropped the second time
//! - Depth-first, children in host order

use std::collections::HashSet;

use crate::graph::store::{NodeRef, NodeStore};
use crate::graph::summary::NodeSummary;

/// Result of one walk.
#[derive(Debug, Clone)]
pub struct Walk {
    pub nodes: Vec<NodeSummary>,
    /// Absolute paths of every node entered, root included.
    pub visited: HashSet<String>,
}

/// Collects nested summaries below a root node.
pub struct GraphWalker<'a> {
    store: &'a dyn NodeStore,
}

impl<'a> GraphWalker<'a> {
    pub fn new(store: &'a dyn NodeStore) -> Self {
        Self { store }
    }

    /// Summaries of `root`'s descendants (the root itself is not listed).
    pub fn collect(&self, root: &NodeRef, prefix: &str) -> Vec<NodeSummary> {
        self.walk(root, prefix).nodes
    }

    pub fn walk(&self, root: &NodeRef, prefix: &str) -> Walk {
        let mut visited = HashSet::new();
        visited.insert(root.path.clone());

        let nodes = self.collect_children(root, prefix, &mut visited);

        tracing::debug!(
            root = %root.path,
            collected = nodes.len(),
            visited = visited.len(),
            "Collected nodes"
        );

        Walk { nodes, visited }
    }

    fn collect_children(
        &self,
        parent: &NodeRef,
        prefix: &str,
        visited: &mut HashSet<String>,
    ) -> Vec<NodeSummary> {
        self.store
            .list_children(parent)
            .iter()
            .filter_map(|child| self.visit(child, prefix, visited))
            .collect()
    }

    fn visit(
        &self,
        node: &NodeRef,
        prefix: &str,
        visited: &mut HashSet<String>,
    ) -> Option<NodeSummary> {
        if !visited.insert(node.path.clone()) {
            tracing::debug!(path = %node.path, "Skipping already processed node");
            return None;
        }

        let node_path = compose_path(prefix, node);
        let mut summary = NodeSummary::detail(self.store, node);
        summary.children = Some(self.collect_children(node, &node_path, visited));
        summary.path = node_path;
        Some(summary)
    }
}

/// Child path under `prefix`, or the child's own path for an empty prefix.
pub fn compose_path(prefix: &str, child: &NodeRef) -> String {
    if prefix.is_empty() {
        child.path.clone()
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), child.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::store::{NodeConnectors, StoreError};
    use crate::graph::value::HostValue;
    use serde_json::{Map, Value};
    use std::collections::HashMap;

    /// Hand-wired graph where children lists may point anywhere.
    struct WiredStore {
        nodes: HashMap<String, (NodeRef, Vec<String>)>,
    }

    impl WiredStore {
        fn new(edges: &[(&str, &[&str])]) -> Self {
            let mut nodes = HashMap::new();
            for (id, (path, children)) in edges.iter().enumerate() {
                let name = path.rsplit('/').next().unwrap_or_default().to_string();
                let node = NodeRef {
                    id: id as u64,
                    name,
                    path: path.to_string(),
                    op_type: "baseCOMP".into(),
                    family: "COMP".into(),
                };
                nodes.insert(
                    path.to_string(),
                    (node, children.iter().map(|c| c.to_string()).collect()),
                );
            }
            Self { nodes }
        }

        fn node(&self, path: &str) -> NodeRef {
            self.nodes[path].0.clone()
        }
    }

    impl NodeStore for WiredStore {
        fn root(&self) -> NodeRef {
            self.node("/")
        }

        fn project_root(&self) -> Option<NodeRef> {
            None
        }

        fn find(&self, path: &str) -> Option<NodeRef> {
            self.nodes.get(path).map(|(node, _)| node.clone())
        }

        fn create(&self, _: &str, type_name: &str, _: &str, _: &Map<String, Value>) -> Result<NodeRef, StoreError> {
            Err(StoreError::Creation(format!("Unknown node type: {}", type_name)))
        }

        fn delete(&self, path: &str) -> Result<bool, StoreError> {
            Err(StoreError::NotFound(path.to_string()))
        }

        fn set_parameter(&self, _: &NodeRef, _: &str, _: &Value) -> Result<bool, StoreError> {
            Ok(false)
        }

        fn list_children(&self, node: &NodeRef) -> Vec<NodeRef> {
            self.nodes[&node.path].1.iter().map(|p| self.node(p)).collect()
        }

        fn connect(&self, _: &NodeRef, _: usize, _: &NodeRef, _: usize, _: bool) -> Result<(), StoreError> {
            Ok(())
        }

        fn parameters(&self, node: &NodeRef) -> Vec<(String, HostValue)> {
            vec![("id".into(), HostValue::Int(node.id as i64))]
        }

        fn connectors(&self, _: &NodeRef) -> NodeConnectors {
            NodeConnectors::default()
        }
    }

    #[test]
    fn test_nested_tree() {
        let store = WiredStore::new(&[
            ("/", &["/project1"]),
            ("/project1", &["/project1/geo1", "/project1/noise1"]),
            ("/project1/geo1", &["/project1/geo1/box1"]),
            ("/project1/geo1/box1", &[]),
            ("/project1/noise1", &[]),
        ]);
        let walker = GraphWalker::new(&store);
        let nodes = walker.collect(&store.node("/project1"), "/project1");

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].path, "/project1/geo1");
        let geo_children = nodes[0].children.as_ref().unwrap();
        assert_eq!(geo_children.len(), 1);
        assert_eq!(geo_children[0].path, "/project1/geo1/box1");
        assert_eq!(geo_children[0].children, Some(vec![]));
        assert_eq!(nodes[1].parameters["id"], serde_json::json!(4));
    }

    #[test]
    fn test_cycle_terminates() {
        // geo1 lists its own parent as a child.
        let store = WiredStore::new(&[
            ("/", &["/project1"]),
            ("/project1", &["/project1/geo1"]),
            ("/project1/geo1", &["/project1", "/project1/geo1/box1"]),
            ("/project1/geo1/box1", &["/project1/geo1"]),
        ]);
        let walk = GraphWalker::new(&store).walk(&store.node("/project1"), "/project1");

        assert_eq!(walk.visited.len(), 3);
        assert_eq!(walk.nodes.len(), 1);
        let geo_children = walk.nodes[0].children.as_ref().unwrap();
        assert_eq!(geo_children.len(), 1);
        assert_eq!(geo_children[0].children, Some(vec![]));
    }

    #[test]
    fn test_diamond_first_visit_wins() {
        // shared is reachable from both a and b.
        let store = WiredStore::new(&[
            ("/", &["/p"]),
            ("/p", &["/p/a", "/p/b"]),
            ("/p/a", &["/p/shared"]),
            ("/p/b", &["/p/shared"]),
            ("/p/shared", &[]),
        ]);
        let walk = GraphWalker::new(&store).walk(&store.node("/p"), "/p");

        assert_eq!(walk.visited.len(), 4);
        assert_eq!(walk.nodes[0].children.as_ref().unwrap().len(), 1);
        assert_eq!(walk.nodes[1].children.as_ref().unwrap().len(), 0);
    }

    #[test]
    fn test_path_composition() {
        let store = WiredStore::new(&[
            ("/", &["/project1"]),
            ("/project1", &["/project1/geo1"]),
            ("/project1/geo1", &[]),
        ]);
        let walker = GraphWalker::new(&store);

        let from_custom = walker.collect(&store.node("/project1"), "/mirror");
        assert_eq!(from_custom[0].path, "/mirror/geo1");

        let from_empty = walker.collect(&store.node("/project1"), "");
        assert_eq!(from_empty[0].path, "/project1/geo1");

        let from_root = walker.collect(&store.node("/"), "/");
        assert_eq!(from_root[0].path, "/project1");
        assert_eq!(from_root[0].children.as_ref().unwrap()[0].path, "/project1/geo1");
    }
}
