//! In-memory host graph.
//!
//! # Responsibilities
//! - Own node records keyed by absolute path
//! - Enforce host rules: naming, containment, connector bounds
//! - Hand out [`NodeRef`] snapshots and host-typed parameter values
//!
//! # Design Decisions
//! - `DashMap` for per-record access; structural changes (create, delete,
//!   connect) are serialized behind one mutex since they touch several records
//! - Node references in parameters are resolved lazily at serialization time

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use serde_json::{json, Map, Value};

use crate::graph::catalog::{self, ParamDefault, TypeSpec, BASE_COMP, CONTAINER_COMP};
use crate::graph::store::{Link, NodeConnectors, NodeRef, NodeStore, NodeTypeInfo, StoreError};
use crate::graph::value::{EvalError, Evaluate, HostValue};

type Records = Arc<DashMap<String, NodeRecord>>;

#[derive(Debug, Clone)]
struct NodeRecord {
    node: NodeRef,
    spec: &'static TypeSpec,
    parent: Option<String>,
    children: Vec<String>,
    params: Vec<(String, ParamValue)>,
    inputs: Vec<Vec<Link>>,
    outputs: Vec<Vec<Link>>,
}

#[derive(Debug, Clone, PartialEq)]
enum ParamValue {
    Float(f64),
    Int(i64),
    Toggle(bool),
    Str(String),
    Menu {
        value: String,
        options: &'static [&'static str],
    },
    OpRef(String),
}

impl From<ParamDefault> for ParamValue {
    fn from(default: ParamDefault) -> Self {
        match default {
            ParamDefault::Float(x) => ParamValue::Float(x),
            ParamDefault::Int(i) => ParamValue::Int(i),
            ParamDefault::Toggle(b) => ParamValue::Toggle(b),
            ParamDefault::Str(s) => ParamValue::Str(s.to_string()),
            ParamDefault::Menu(value, options) => ParamValue::Menu {
                value: value.to_string(),
                options,
            },
            ParamDefault::OpRef(path) => ParamValue::OpRef(path.to_string()),
        }
    }
}

impl ParamValue {
    /// Coerce `input` into this parameter's kind.
    fn assign(&mut self, input: &Value) -> Result<(), String> {
        match self {
            ParamValue::Float(x) => {
                *x = as_float(input).ok_or_else(|| "expected a number".to_string())?;
            }
            ParamValue::Int(i) => {
                *i = as_int(input).ok_or_else(|| "expected an integer".to_string())?;
            }
            ParamValue::Toggle(b) => {
                *b = as_toggle(input).ok_or_else(|| "expected a boolean".to_string())?;
            }
            ParamValue::Str(s) => {
                *s = as_text(input).ok_or_else(|| "expected a string".to_string())?;
            }
            ParamValue::Menu { value, options } => {
                let choice = as_text(input).ok_or_else(|| "expected a string".to_string())?;
                if !options.contains(&choice.as_str()) {
                    return Err(format!("expected one of: {}", options.join(", ")));
                }
                *value = choice;
            }
            ParamValue::OpRef(path) => {
                *path = match input {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    _ => return Err("expected a node path".to_string()),
                };
            }
        }
        Ok(())
    }

    fn to_host(&self, records: &Records, base: &str) -> HostValue {
        match self {
            ParamValue::Float(x) => HostValue::Float(*x),
            ParamValue::Int(i) => HostValue::Int(*i),
            ParamValue::Toggle(b) => HostValue::Bool(*b),
            ParamValue::Str(s) => HostValue::Str(s.clone()),
            ParamValue::Menu { value, .. } => HostValue::Str(value.clone()),
            ParamValue::OpRef(path) => {
                let target = if path.is_empty() || path.starts_with('/') {
                    path.clone()
                } else {
                    child_path(base, path)
                };
                HostValue::lazy(OpReference {
                    records: Arc::clone(records),
                    path: target,
                })
            }
        }
    }
}

fn as_float(input: &Value) -> Option<f64> {
    match input {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn as_int(input: &Value) -> Option<i64> {
    match input {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|x| x.fract() == 0.0).map(|x| x as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn as_toggle(input: &Value) -> Option<bool> {
    match input {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|x| x != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Some(true),
            "false" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_text(input: &Value) -> Option<String> {
    match input {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Node reference parameter, resolved when serialized.
struct OpReference {
    records: Records,
    path: String,
}

impl Evaluate for OpReference {
    fn evaluate(&self) -> Result<HostValue, EvalError> {
        if self.path.is_empty() {
            return Ok(HostValue::Null);
        }
        self.records
            .get(&self.path)
            .map(|record| HostValue::NodeReference(record.node.clone()))
            .ok_or_else(|| EvalError(format!("Node not found: {}", self.path)))
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Absolute path without a trailing slash, or `None` for relative/empty input.
fn normalize(path: &str) -> Option<String> {
    let path = path.trim();
    if !path.starts_with('/') {
        return None;
    }
    let trimmed = path.trim_end_matches('/');
    Some(if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() })
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// `noise12` → (`noise`, 12); `noise` → (`noise`, 0).
fn split_numeric_suffix(name: &str) -> (&str, u64) {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = name[stem.len()..].parse().unwrap_or(0);
    (stem, number)
}

/// Host graph kept entirely in memory.
pub struct MemoryNodeStore {
    records: Records,
    next_id: AtomicU64,
    project_path: String,
    structure: Mutex<()>,
}

impl MemoryNodeStore {
    /// Create a store with `/` plus the project root at `project_path`.
    ///
    /// Intermediate components are created as plain `baseCOMP`s; the project
    /// root itself is a `containerCOMP`.
    pub fn new(project_path: &str) -> Result<Self, StoreError> {
        let project_path = normalize(project_path)
            .ok_or_else(|| StoreError::InvalidRequest(format!("Invalid project path: {}", project_path)))?;

        let store = Self {
            records: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
            project_path: project_path.clone(),
            structure: Mutex::new(()),
        };

        store.insert_record(None, &BASE_COMP, "");

        let segments: Vec<&str> = project_path.split('/').filter(|s| !s.is_empty()).collect();
        let mut parent = "/".to_string();
        for (i, segment) in segments.iter().enumerate() {
            if !is_valid_name(segment) {
                return Err(StoreError::InvalidRequest(format!(
                    "Invalid project path: {}",
                    project_path
                )));
            }
            let spec: &'static TypeSpec = if i + 1 == segments.len() {
                &CONTAINER_COMP
            } else {
                &BASE_COMP
            };
            parent = store.insert_record(Some(&parent), spec, segment).path;
        }

        tracing::debug!(project = %project_path, "In-memory store ready");
        Ok(store)
    }

    /// Populate the project with a small connected network.
    pub fn seed_demo(&self) -> Result<(), StoreError> {
        let project = self.project_path.clone();
        let none = Map::new();

        let noise = self.create(&project, "noiseTOP", "", &none)?;
        let level = self.create(&project, "levelTOP", "", &none)?;
        let out = self.create(&project, "nullTOP", "out1", &none)?;
        self.connect(&noise, 0, &level, 0, false)?;
        self.connect(&level, 0, &out, 0, false)?;

        let geo = self.create(&project, "geometryCOMP", "geo1", &none)?;
        self.create(&geo.path, "boxSOP", "", &none)?;
        let material = self.create(&project, "phongMAT", "", &none)?;
        self.set_parameter(&geo, "material", &json!(material.name))?;

        let mut notes = Map::new();
        notes.insert("text".into(), json!("Demo network"));
        self.create(&project, "textDAT", "notes", &notes)?;

        tracing::info!(project = %project, nodes = self.records.len(), "Seeded demo network");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.structure.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self, path: &str) -> Option<NodeRef> {
        self.records.get(path).map(|record| record.node.clone())
    }

    fn insert_record(&self, parent: Option<&str>, spec: &'static TypeSpec, name: &str) -> NodeRef {
        let path = match parent {
            Some(parent) => child_path(parent, name),
            None => "/".to_string(),
        };
        let node = NodeRef {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            path: path.clone(),
            op_type: spec.op_type(),
            family: spec.family.to_string(),
        };
        let record = NodeRecord {
            node: node.clone(),
            spec,
            parent: parent.map(str::to_string),
            children: Vec::new(),
            params: spec
                .params
                .iter()
                .map(|param| (param.name.to_string(), ParamValue::from(param.default)))
                .collect(),
            inputs: vec![Vec::new(); spec.inputs],
            outputs: vec![Vec::new(); spec.outputs],
        };
        self.records.insert(path.clone(), record);

        if let Some(parent) = parent {
            if let Some(mut parent) = self.records.get_mut(parent) {
                parent.children.push(path);
            }
        }
        node
    }

    /// First free name under `parent`, bumping any numeric suffix.
    fn unique_name(&self, parent: &str, wanted: &str) -> Result<String, StoreError> {
        if !self.records.contains_key(&child_path(parent, wanted)) {
            return Ok(wanted.to_string());
        }
        let (stem, mut number) = split_numeric_suffix(wanted);
        loop {
            number = number.checked_add(1).ok_or_else(|| {
                StoreError::Creation(format!("No free name left for {} under {}", wanted, parent))
            })?;
            let candidate = format!("{}{}", stem, number);
            if !self.records.contains_key(&child_path(parent, &candidate)) {
                return Ok(candidate);
            }
        }
    }

    /// `path` and every descendant, parents first.
    fn subtree(&self, path: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![path.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(record) = self.records.get(&current) {
                stack.extend(record.children.iter().rev().cloned());
            }
            out.push(current);
        }
        out
    }

    /// Remove every link between `path` and its peers.
    fn disconnect_all(&self, path: &str) {
        let (inputs, outputs) = match self.records.get_mut(path) {
            Some(mut record) => {
                let inputs = std::mem::take(&mut record.inputs);
                let outputs = std::mem::take(&mut record.outputs);
                record.inputs = vec![Vec::new(); inputs.len()];
                record.outputs = vec![Vec::new(); outputs.len()];
                (inputs, outputs)
            }
            None => return,
        };

        for (index, links) in inputs.iter().enumerate() {
            for link in links {
                if let Some(mut peer) = self.records.get_mut(&link.node_path) {
                    if let Some(slot) = peer.outputs.get_mut(link.index) {
                        slot.retain(|l| !(l.node_path == path && l.index == index));
                    }
                }
            }
        }
        for (index, links) in outputs.iter().enumerate() {
            for link in links {
                if let Some(mut peer) = self.records.get_mut(&link.node_path) {
                    if let Some(slot) = peer.inputs.get_mut(link.index) {
                        slot.retain(|l| !(l.node_path == path && l.index == index));
                    }
                }
            }
        }
    }

    fn clear_input(&self, path: &str, in_index: usize) {
        let removed = match self.records.get_mut(path) {
            Some(mut record) => match record.inputs.get_mut(in_index) {
                Some(slot) => std::mem::take(slot),
                None => return,
            },
            None => return,
        };
        for link in removed {
            if let Some(mut peer) = self.records.get_mut(&link.node_path) {
                if let Some(slot) = peer.outputs.get_mut(link.index) {
                    slot.retain(|l| !(l.node_path == path && l.index == in_index));
                }
            }
        }
    }

    fn is_protected(&self, path: &str) -> bool {
        path == "/" || path == self.project_path || self.project_path.starts_with(&format!("{}/", path))
    }
}

impl NodeStore for MemoryNodeStore {
    fn root(&self) -> NodeRef {
        self.snapshot("/").unwrap_or_else(|| NodeRef {
            id: 0,
            name: String::new(),
            path: "/".to_string(),
            op_type: BASE_COMP.op_type(),
            family: BASE_COMP.family.to_string(),
        })
    }

    fn project_root(&self) -> Option<NodeRef> {
        self.snapshot(&self.project_path)
    }

    fn find(&self, path: &str) -> Option<NodeRef> {
        normalize(path).and_then(|path| self.snapshot(&path))
    }

    fn create(
        &self,
        parent_path: &str,
        type_name: &str,
        name: &str,
        parameters: &Map<String, Value>,
    ) -> Result<NodeRef, StoreError> {
        let spec = catalog::lookup(type_name)
            .ok_or_else(|| StoreError::Creation(format!("Unknown node type: {}", type_name)))?;
        if !name.is_empty() && !is_valid_name(name) {
            return Err(StoreError::Creation(format!("Invalid node name: {}", name)));
        }

        let _guard = self.lock();

        let parent = normalize(parent_path)
            .ok_or_else(|| StoreError::Creation(format!("Invalid parent path: {}", parent_path)))?;
        let parent_spec = self
            .records
            .get(&parent)
            .map(|record| record.spec)
            .ok_or_else(|| StoreError::Creation(format!("Parent not found: {}", parent)))?;
        if !parent_spec.is_container() {
            return Err(StoreError::Creation(format!(
                "{} ({}) cannot contain child nodes",
                parent,
                parent_spec.op_type()
            )));
        }

        let wanted = if name.is_empty() {
            format!("{}1", spec.name)
        } else {
            name.to_string()
        };
        let name = self.unique_name(&parent, &wanted)?;
        let node = self.insert_record(Some(&parent), spec, &name);

        for (param, value) in parameters {
            match self.set_parameter(&node, param, value) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(node = %node.path, parameter = %param, "Unknown parameter ignored");
                }
                Err(e) => {
                    tracing::warn!(node = %node.path, error = %e, "Parameter not applied");
                }
            }
        }

        tracing::debug!(node = %node.path, op_type = %node.op_type, "Node created");
        Ok(node)
    }

    fn delete(&self, path: &str) -> Result<bool, StoreError> {
        let path = normalize(path).ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        if self.is_protected(&path) {
            return Err(StoreError::InvalidRequest(format!("Cannot delete root node: {}", path)));
        }

        let _guard = self.lock();

        let parent = self
            .records
            .get(&path)
            .map(|record| record.parent.clone())
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;

        let doomed = self.subtree(&path);
        for node in &doomed {
            self.disconnect_all(node);
        }
        for node in &doomed {
            self.records.remove(node);
        }
        if let Some(parent) = parent {
            if let Some(mut record) = self.records.get_mut(&parent) {
                record.children.retain(|child| child != &path);
            }
        }

        tracing::debug!(node = %path, removed = doomed.len(), "Node deleted");
        Ok(true)
    }

    fn set_parameter(&self, node: &NodeRef, name: &str, value: &Value) -> Result<bool, StoreError> {
        let mut record = self
            .records
            .get_mut(&node.path)
            .ok_or_else(|| StoreError::NotFound(node.path.clone()))?;

        let Some((_, param)) = record.params.iter_mut().find(|(n, _)| n == name) else {
            return Ok(false);
        };
        param.assign(value).map_err(|reason| StoreError::InvalidParameter {
            name: name.to_string(),
            reason,
        })?;
        Ok(true)
    }

    fn list_children(&self, node: &NodeRef) -> Vec<NodeRef> {
        let children = match self.records.get(&node.path) {
            Some(record) => record.children.clone(),
            None => return Vec::new(),
        };
        children.iter().filter_map(|path| self.snapshot(path)).collect()
    }

    fn connect(
        &self,
        from: &NodeRef,
        out_index: usize,
        to: &NodeRef,
        in_index: usize,
        clear_existing: bool,
    ) -> Result<(), StoreError> {
        if from.path == to.path {
            return Err(StoreError::Connection(format!(
                "Cannot connect {} to itself",
                from.path
            )));
        }

        let _guard = self.lock();

        let (from_parent, outputs) = self
            .records
            .get(&from.path)
            .map(|record| (record.parent.clone(), record.outputs.len()))
            .ok_or_else(|| StoreError::NotFound(from.path.clone()))?;
        let (to_parent, inputs) = self
            .records
            .get(&to.path)
            .map(|record| (record.parent.clone(), record.inputs.len()))
            .ok_or_else(|| StoreError::NotFound(to.path.clone()))?;

        if from_parent != to_parent {
            return Err(StoreError::Connection(format!(
                "{} and {} do not share a parent",
                from.path, to.path
            )));
        }
        if out_index >= outputs {
            return Err(StoreError::Connection(format!(
                "Output index {} out of range for {} ({} outputs)",
                out_index, from.path, outputs
            )));
        }
        if in_index >= inputs {
            return Err(StoreError::Connection(format!(
                "Input index {} out of range for {} ({} inputs)",
                in_index, to.path, inputs
            )));
        }

        if clear_existing {
            self.clear_input(&to.path, in_index);
        }

        let incoming = Link {
            node_path: from.path.clone(),
            index: out_index,
        };
        if let Some(mut record) = self.records.get_mut(&to.path) {
            let slot = &mut record.inputs[in_index];
            if slot.contains(&incoming) {
                return Ok(());
            }
            slot.push(incoming);
        }
        if let Some(mut record) = self.records.get_mut(&from.path) {
            record.outputs[out_index].push(Link {
                node_path: to.path.clone(),
                index: in_index,
            });
        }

        tracing::debug!(
            from = %from.path,
            out_index,
            to = %to.path,
            in_index,
            "Nodes connected"
        );
        Ok(())
    }

    fn parameters(&self, node: &NodeRef) -> Vec<(String, HostValue)> {
        let Some(record) = self.records.get(&node.path) else {
            return Vec::new();
        };
        let params = record.params.clone();
        let base = record.parent.clone().unwrap_or_else(|| "/".to_string());
        drop(record);

        params
            .iter()
            .map(|(name, value)| (name.clone(), value.to_host(&self.records, &base)))
            .collect()
    }

    fn connectors(&self, node: &NodeRef) -> NodeConnectors {
        self.records
            .get(&node.path)
            .map(|record| NodeConnectors {
                inputs: record.inputs.clone(),
                outputs: record.outputs.clone(),
            })
            .unwrap_or_default()
    }

    fn node_types(&self) -> Vec<NodeTypeInfo> {
        catalog::CATALOG.iter().map(TypeSpec::info).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::serializer::serialize_named;

    fn store() -> MemoryNodeStore {
        MemoryNodeStore::new("/project1").unwrap()
    }

    fn create(store: &MemoryNodeStore, op_type: &str, name: &str) -> NodeRef {
        store.create("/project1", op_type, name, &Map::new()).unwrap()
    }

    #[test]
    fn test_new_builds_project_root() {
        let store = MemoryNodeStore::new("/work/project1/").unwrap();
        let project = store.project_root().unwrap();
        assert_eq!(project.path, "/work/project1");
        assert_eq!(project.op_type, "containerCOMP");
        assert_eq!(store.find("/work").unwrap().op_type, "baseCOMP");
        assert_eq!(store.root().path, "/");
        assert_eq!(store.list_children(&store.root())[0].path, "/work");

        assert!(MemoryNodeStore::new("project1").is_err());
        assert!(MemoryNodeStore::new("/bad name").is_err());
    }

    #[test]
    fn test_names_deduplicate() {
        let store = store();
        assert_eq!(create(&store, "noiseTOP", "").name, "noise1");
        assert_eq!(create(&store, "noiseTOP", "").name, "noise2");
        assert_eq!(create(&store, "noiseTOP", "noise1").name, "noise3");
        assert_eq!(create(&store, "levelTOP", "fx").name, "fx");
        assert_eq!(create(&store, "levelTOP", "fx").name, "fx1");
    }

    #[test]
    fn test_name_suffix_exhausted() {
        let store = store();
        let last = format!("n{}", u64::MAX);
        assert_eq!(create(&store, "nullTOP", &last).name, last);

        let err = store.create("/project1", "nullTOP", &last, &Map::new()).unwrap_err();
        assert!(matches!(err, StoreError::Creation(_)));

        // Still usable afterwards.
        assert_eq!(create(&store, "nullTOP", "n1").name, "n1");
    }

    #[test]
    fn test_create_errors() {
        let store = store();
        let err = store.create("/project1", "bogusTOP", "", &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown node type: bogusTOP");

        let noise = create(&store, "noiseTOP", "");
        let err = store.create(&noise.path, "levelTOP", "", &Map::new()).unwrap_err();
        assert!(matches!(err, StoreError::Creation(_)));

        let err = store.create("/missing", "levelTOP", "", &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Parent not found: /missing");

        let err = store.create("/project1", "levelTOP", "1abc", &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid node name: 1abc");
    }

    #[test]
    fn test_create_applies_parameters() {
        let store = store();
        let mut params = Map::new();
        params.insert("amp".into(), json!(0.25));
        params.insert("resolutionw".into(), json!("512"));
        params.insert("nosuch".into(), json!(1));
        params.insert("monochrome".into(), json!([1, 2]));
        let noise = store.create("/project1", "noiseTOP", "", &params).unwrap();

        let values = serialize_named(&store.parameters(&noise));
        assert_eq!(values["amp"], json!(0.25));
        assert_eq!(values["resolutionw"], json!(512));
        assert_eq!(values["monochrome"], json!(true));
        assert!(!values.contains_key("nosuch"));
    }

    #[test]
    fn test_set_parameter_coercion() {
        let store = store();
        let noise = create(&store, "noiseTOP", "");

        assert!(store.set_parameter(&noise, "seed", &json!(7)).unwrap());
        assert!(!store.set_parameter(&noise, "nosuch", &json!(7)).unwrap());
        assert!(store.set_parameter(&noise, "monochrome", &json!("off")).unwrap());

        let err = store.set_parameter(&noise, "seed", &json!({"x": 1})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for parameter seed: expected a number");

        let err = store.set_parameter(&noise, "type", &json!("voronoi")).unwrap_err();
        assert!(err.to_string().contains("expected one of: simplex3d"));

        let values = serialize_named(&store.parameters(&noise));
        assert_eq!(values["seed"], json!(7.0));
        assert_eq!(values["monochrome"], json!(false));
    }

    #[test]
    fn test_op_reference_resolves_lazily() {
        let store = store();
        let base = create(&store, "baseCOMP", "");
        let noise = create(&store, "noiseTOP", "");

        store.set_parameter(&base, "opviewer", &json!("noise1")).unwrap();
        assert_eq!(serialize_named(&store.parameters(&base))["opviewer"], json!(noise.path));

        store.delete(&noise.path).unwrap();
        assert_eq!(
            serialize_named(&store.parameters(&base))["opviewer"],
            json!("<error: Node not found: /project1/noise1>")
        );

        store.set_parameter(&base, "opviewer", &Value::Null).unwrap();
        assert_eq!(serialize_named(&store.parameters(&base))["opviewer"], Value::Null);
    }

    #[test]
    fn test_connect_rules() {
        let store = store();
        let a = create(&store, "noiseTOP", "");
        let b = create(&store, "noiseTOP", "");
        let comp = create(&store, "compositeTOP", "");

        store.connect(&a, 0, &comp, 0, false).unwrap();
        store.connect(&a, 0, &comp, 0, false).unwrap();
        store.connect(&b, 0, &comp, 0, false).unwrap();
        assert_eq!(store.connectors(&comp).inputs[0].len(), 2);

        store.connect(&b, 0, &comp, 0, true).unwrap();
        let inputs = store.connectors(&comp).inputs;
        assert_eq!(inputs[0], vec![Link { node_path: b.path.clone(), index: 0 }]);
        assert!(store.connectors(&a).outputs[0].is_empty());

        assert!(matches!(store.connect(&a, 1, &comp, 0, false), Err(StoreError::Connection(_))));
        assert!(matches!(store.connect(&a, 0, &comp, 2, false), Err(StoreError::Connection(_))));
        assert!(matches!(store.connect(&a, 0, &a, 0, false), Err(StoreError::Connection(_))));

        let geo = create(&store, "geometryCOMP", "");
        let inner = store.create(&geo.path, "transformSOP", "", &Map::new()).unwrap();
        assert!(matches!(store.connect(&a, 0, &inner, 0, false), Err(StoreError::Connection(_))));
    }

    #[test]
    fn test_delete_cascades() {
        let store = store();
        let geo = create(&store, "geometryCOMP", "");
        let sphere = store.create(&geo.path, "sphereSOP", "", &Map::new()).unwrap();
        let xform = store.create(&geo.path, "transformSOP", "", &Map::new()).unwrap();
        store.connect(&sphere, 0, &xform, 0, false).unwrap();
        let before = store.len();

        assert!(store.delete(&sphere.path).unwrap());
        assert!(store.connectors(&xform).inputs[0].is_empty());

        assert!(store.delete(&geo.path).unwrap());
        assert!(store.find(&xform.path).is_none());
        assert_eq!(store.len(), before - 3);
        assert!(store.list_children(&store.project_root().unwrap()).is_empty());
    }

    #[test]
    fn test_delete_errors() {
        let store = store();
        assert!(matches!(store.delete("/project1/nope"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("/project1"), Err(StoreError::InvalidRequest(_))));
        assert!(matches!(store.delete("/"), Err(StoreError::InvalidRequest(_))));
    }

    #[test]
    fn test_seed_demo() {
        let store = store();
        store.seed_demo().unwrap();

        let level = store.find("/project1/level1").unwrap();
        let connectors = store.connectors(&level);
        assert_eq!(connectors.inputs[0][0].node_path, "/project1/noise1");
        assert_eq!(connectors.outputs[0][0].node_path, "/project1/out1");

        let geo = store.find("/project1/geo1").unwrap();
        assert_eq!(serialize_named(&store.parameters(&geo))["material"], json!("/project1/phong1"));
        assert_eq!(store.list_children(&geo)[0].name, "box1");
    }

    #[test]
    fn test_node_types_cover_catalog() {
        let types = store().node_types();
        assert_eq!(types.len(), catalog::CATALOG.len());
        assert!(types.iter().any(|t| t.op_type == "noiseTOP" && t.outputs == 1));
    }
}
