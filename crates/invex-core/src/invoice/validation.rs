//! Classification of generative parser payloads.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{InvexError, Result};

/// Accept a payload as a JSON object, or reject it as `InvalidLlmJson`.
///
/// Objects pass through unchanged. Strings are parsed strictly after removing
/// a surrounding Markdown code fence, which chat models add unprompted; the
/// parser diagnostic is kept as the error detail. Anything else, including a
/// string holding a non-object JSON value, is rejected.
pub fn classify_llm_payload(raw: &Value) -> Result<Map<String, Value>> {
    match raw {
        Value::Object(map) => Ok(map.clone()),
        Value::String(s) => {
            let body = strip_code_fence(s);
            match serde_json::from_str::<Value>(body) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(InvexError::invalid_json(format!(
                    "expected a JSON object, got {}",
                    kind(&other)
                ))),
                Err(e) => {
                    debug!("Rejected generative payload: {}", e);
                    Err(InvexError::invalid_json(e.to_string()))
                }
            }
        }
        other => Err(InvexError::invalid_json(format!(
            "expected a JSON object or string, got {}",
            kind(other)
        ))),
    }
}

/// Remove a surrounding ```` ``` ```` or ```` ```json ```` fence, if any.
pub fn strip_code_fence(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line.
    match body.split_once('\n') {
        Some((info, inner)) if info.trim().chars().all(|c| c.is_ascii_alphanumeric()) => inner.trim(),
        _ => body.trim(),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
