//! Helpers for reading model-supplied tool arguments.

use agentic_core::error::ToolError;
use serde_json::{Map, Value};

/// A required, non-blank string argument.
pub fn required_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err(ToolError::InvalidArguments(format!("'{key}' is required")))
        }
        Some(_) => Err(ToolError::InvalidArguments(format!("'{key}' must be a string"))),
    }
}

/// An optional string argument; blank counts as absent.
pub fn optional_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// An optional positive count. Models often send numbers as strings, so
/// `"5"` is accepted alongside `5`.
pub fn optional_count(args: &Map<String, Value>, key: &str, default: u64) -> u64 {
    let parsed = match args.get(key) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|n| *n > 0).unwrap_or(default)
}

/// `{"error": message}`, the shape tools use for recoverable failures.
pub fn error_payload(message: impl Into<String>) -> Value {
    serde_json::json!({ "error": message.into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn required_str_variants() {
        let args = map(json!({"a": "x", "b": "  ", "c": 3}));
        assert_eq!(required_str(&args, "a").unwrap(), "x");
        assert!(required_str(&args, "b").is_err());
        assert!(required_str(&args, "c").unwrap_err().to_string().contains("string"));
        assert!(required_str(&args, "missing").is_err());
    }

    #[test]
    fn counts_accept_numbers_and_strings() {
        let args = map(json!({"n": 5, "s": "7", "zero": 0, "bad": "many"}));
        assert_eq!(optional_count(&args, "n", 3), 5);
        assert_eq!(optional_count(&args, "s", 3), 7);
        assert_eq!(optional_count(&args, "zero", 3), 3);
        assert_eq!(optional_count(&args, "bad", 3), 3);
        assert_eq!(optional_count(&args, "absent", 3), 3);
    }
}
