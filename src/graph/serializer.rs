//! Total conversion of host values into JSON.
//!
//! Dispatch order matters: deferred values and node references are resolved
//! before the generic object branch, otherwise they would render as their
//! internal fields.

use serde_json::{Map, Number, Value};

use crate::graph::value::HostValue;

/// Nesting bound; deeper values render as an error string.
pub const MAX_DEPTH: usize = 64;

const DEPTH_EXCEEDED: &str = "<error: maximum serialization depth exceeded>";

/// Convert any host value into a JSON-safe value. Never fails.
pub fn serialize(value: &HostValue) -> Value {
    serialize_at(value, 0)
}

/// Serialize a list of named values into a JSON object, keeping the first
/// occurrence of a duplicated name.
pub fn serialize_named(values: &[(String, HostValue)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in values {
        if !map.contains_key(name) {
            map.insert(name.clone(), serialize(value));
        }
    }
    map
}

fn serialize_at(value: &HostValue, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::String(DEPTH_EXCEEDED.to_string());
    }

    match value {
        HostValue::Null => Value::Null,
        HostValue::Bool(b) => Value::Bool(*b),
        HostValue::Int(i) => Value::Number((*i).into()),
        HostValue::Float(x) => Number::from_f64(*x)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(x.to_string())),
        HostValue::Str(s) => Value::String(s.clone()),
        HostValue::Sequence(items) => Value::Array(
            items
                .iter()
                .map(|item| serialize_at(item, depth + 1))
                .collect(),
        ),
        HostValue::Mapping(entries) => {
            let mut map = Map::new();
            for (key, item) in entries {
                map.insert(key.to_string(), serialize_at(item, depth + 1));
            }
            Value::Object(map)
        }
        HostValue::Lazy(lazy) => match lazy.evaluate() {
            Ok(HostValue::NodeReference(node)) => Value::String(node.path),
            Ok(evaluated) => serialize_at(&evaluated, depth + 1),
            Err(e) => Value::String(format!("<error: {}>", e)),
        },
        HostValue::NodeReference(node) => Value::String(node.path.clone()),
        HostValue::DisplayOnly { tag, name } => Value::String(format!("{}:{}", tag, name)),
        HostValue::Object(object) => match object.fields() {
            Ok(fields) => {
                let mut map = Map::new();
                for (name, field) in fields.iter().filter(|(name, _)| !name.starts_with('_')) {
                    map.insert(name.clone(), serialize_at(field, depth + 1));
                }
                Value::Object(map)
            }
            Err(e) => {
                tracing::debug!(object = object.type_name(), error = %e, "Field enumeration failed, using string form");
                Value::String(value.to_string())
            }
        },
        HostValue::Opaque(s) => Value::String(s.clone()),
    }
}
