//! Host values as they enter the core.
//!
//! The host hands out values of many shapes: plain scalars, containers,
//! deferred parameters that must be evaluated, references to other nodes,
//! display-only grouping objects, and arbitrary objects with fields. Each
//! shape is a variant here, so serialization dispatches on a tag.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::graph::store::NodeRef;

/// Failure while evaluating a deferred value or reading object fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct EvalError(pub String);

/// A deferred value, such as an expression-driven parameter.
pub trait Evaluate: Send + Sync {
    fn evaluate(&self) -> Result<HostValue, EvalError>;
}

/// An opaque host object exposing named fields.
pub trait HostObject: Send + Sync {
    fn type_name(&self) -> &str;

    /// Field names and values, including private (`_`-prefixed) ones.
    fn fields(&self) -> Result<Vec<(String, HostValue)>, EvalError>;
}

#[derive(Clone)]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Sequence(Vec<HostValue>),
    /// Key/value pairs; keys are coerced to strings on output.
    Mapping(Vec<(HostValue, HostValue)>),
    Lazy(Arc<dyn Evaluate>),
    NodeReference(NodeRef),
    /// UI-only object rendered as `"<tag>:<name>"`.
    DisplayOnly { tag: String, name: String },
    Object(Arc<dyn HostObject>),
    /// Anything else, kept as its string form.
    Opaque(String),
}

impl HostValue {
    pub fn lazy(evaluate: impl Evaluate + 'static) -> Self {
        HostValue::Lazy(Arc::new(evaluate))
    }

    pub fn object(object: impl HostObject + 'static) -> Self {
        HostValue::Object(Arc::new(object))
    }

    pub fn display_only(tag: impl Into<String>, name: impl Into<String>) -> Self {
        HostValue::DisplayOnly {
            tag: tag.into(),
            name: name.into(),
        }
    }

    /// Variant name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "str",
            HostValue::Sequence(_) => "sequence",
            HostValue::Mapping(_) => "mapping",
            HostValue::Lazy(_) => "lazy",
            HostValue::NodeReference(_) => "node",
            HostValue::DisplayOnly { .. } => "display",
            HostValue::Object(_) => "object",
            HostValue::Opaque(_) => "opaque",
        }
    }
}

/// String conversion used for mapping keys and as the serializer fallback.
impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => f.write_str("null"),
            HostValue::Bool(b) => write!(f, "{}", b),
            HostValue::Int(i) => write!(f, "{}", i),
            HostValue::Float(x) => write!(f, "{}", x),
            HostValue::Str(s) | HostValue::Opaque(s) => f.write_str(s),
            HostValue::Sequence(items) => write!(f, "<sequence of {}>", items.len()),
            HostValue::Mapping(entries) => write!(f, "<mapping of {}>", entries.len()),
            HostValue::Lazy(_) => f.write_str("<lazy value>"),
            HostValue::NodeReference(node) => f.write_str(&node.path),
            HostValue::DisplayOnly { tag, name } => write!(f, "{}:{}", tag, name),
            HostValue::Object(object) => write!(f, "<{} object>", object.type_name()),
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Sequence(items) => f.debug_list().entries(items).finish(),
            HostValue::Mapping(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            other => write!(f, "{}({})", other.kind(), other),
        }
    }
}

impl From<&Value> for HostValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => HostValue::Int(i),
                None => HostValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => HostValue::Str(s.clone()),
            Value::Array(items) => HostValue::Sequence(items.iter().map(HostValue::from).collect()),
            Value::Object(map) => HostValue::Mapping(
                map.iter()
                    .map(|(k, v)| (HostValue::Str(k.clone()), HostValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        HostValue::from(&value)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i64> for HostValue {
    fn from(i: i64) -> Self {
        HostValue::Int(i)
    }
}

impl From<f64> for HostValue {
    fn from(x: f64) -> Self {
        HostValue::Float(x)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s)
    }
}

impl From<NodeRef> for HostValue {
    fn from(node: NodeRef) -> Self {
        HostValue::NodeReference(node)
    }
}
