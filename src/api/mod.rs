//! Node API endpoints.
//!
//! # Responsibilities
//! - Implement one handler per endpoint against a shared `NodeStore`
//! - Register every route in a fixed order ([`routes::build_api_router`])
//!
//! # Design Decisions
//! - Handlers hold `Arc<dyn NodeStore>`; the store owns all synchronization
//! - Validation failures are returned as `ApiError`s, never written by hand

use serde_json::{Map, Value};

use crate::http::ResponseContext;
use crate::protocol::ApiError;
use crate::routing::{HandlerResult, PathCaptures};

pub mod info;
pub mod nodes;
pub mod routes;

pub use routes::build_api_router;

/// Write `body` with `status` and report it as the handler value.
pub(crate) fn reply(response: &mut ResponseContext, status: u16, body: Value) -> HandlerResult {
    response.write_json(status, body.clone());
    Ok(Some(body))
}

/// Node path captured from `/api/nodes(/.*)?`.
pub(crate) fn captured_node_path(captures: &PathCaptures) -> Result<&str, ApiError> {
    captures
        .first()
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ApiError::validation("Missing node path in URL"))
}

/// Non-empty string field of a JSON object body.
pub(crate) fn required_str<'a>(body: &'a Map<String, Value>, field: &str) -> Result<&'a str, ApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::validation(format!("Missing required parameter: {}", field)))
}

/// Optional string field; absent or null reads as `""`.
pub(crate) fn optional_str<'a>(body: &'a Map<String, Value>, field: &str) -> Result<&'a str, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(ApiError::validation(format!("Invalid value for {}: expected a string", field))),
    }
}

/// Optional connector index; absent or null reads as 0.
pub(crate) fn optional_index(body: &Map<String, Value>, field: &str) -> Result<usize, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .ok_or_else(|| ApiError::validation(format!("Invalid connection index: {}", field))),
    }
}

/// Parameters given either as an object or as a JSON-encoded string.
///
/// Anything unusable is logged and treated as no parameters.
pub(crate) fn parse_parameters(value: Option<&Value>) -> Map<String, Value> {
    match value {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(text)) if text.trim().is_empty() => Map::new(),
        Some(Value::String(text)) => match serde_json::from_str::<Map<String, Value>>(text) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "Parameter string is not a JSON object, ignoring");
                Map::new()
            }
        },
        Some(other) => {
            tracing::warn!(kind = %json_kind(other), "Parameters must be an object, ignoring");
            Map::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_parameters_shapes() {
        let expected = json!({"amp": 0.5}).as_object().cloned().unwrap();
        assert_eq!(parse_parameters(Some(&json!({"amp": 0.5}))), expected);
        assert_eq!(parse_parameters(Some(&json!("{\"amp\": 0.5}"))), expected);
        assert!(parse_parameters(Some(&json!("amp=0.5"))).is_empty());
        assert!(parse_parameters(Some(&json!([1, 2]))).is_empty());
        assert!(parse_parameters(Some(&json!(""))).is_empty());
        assert!(parse_parameters(None).is_empty());
    }

    #[test]
    fn test_optional_fields() {
        let body = json!({"nodeName": 123, "label": "geo", "outIndex": 2, "toIndex": -1, "spare": 1.5, "tag": "x"});
        let body = body.as_object().unwrap();
        assert_eq!(optional_str(body, "label"), Ok("geo"));
        assert_eq!(optional_str(body, "missing"), Ok(""));
        assert_eq!(
            optional_str(body, "nodeName"),
            Err(ApiError::validation("Invalid value for nodeName: expected a string"))
        );

        assert_eq!(optional_index(body, "outIndex"), Ok(2));
        assert_eq!(optional_index(body, "missing"), Ok(0));
        for field in ["toIndex", "spare", "tag"] {
            assert_eq!(
                optional_index(body, field),
                Err(ApiError::validation(format!("Invalid connection index: {}", field)))
            );
        }
    }

    #[test]
    fn test_required_str() {
        let body = json!({"nodeType": "noise", "nodeFamily": ""});
        let body = body.as_object().unwrap();
        assert_eq!(required_str(body, "nodeType"), Ok("noise"));
        assert_eq!(
            required_str(body, "nodeFamily"),
            Err(ApiError::validation("Missing required parameter: nodeFamily"))
        );
    }
}
