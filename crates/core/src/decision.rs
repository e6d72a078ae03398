//! The decision protocol spoken between the loop and the model.
//!
//! Each step the model must reply with exactly one JSON object:
//!
//! ```json
//! {"decision":"ANSWER","final":"<text>"}
//! {"decision":"CALL_TOOL","tool":"<name>","arguments":{ ... }}
//! ```
//!
//! The discriminant is checked first (case-insensitively); only then are the
//! variant's own fields read. Extra fields are ignored. Anything else is a
//! [`ProtocolError`], which the loop turns into a plain-text answer.

use serde_json::{Map, Value};

use crate::error::ProtocolError;

pub const ANSWER_TAG: &str = "ANSWER";
pub const CALL_TOOL_TAG: &str = "CALL_TOOL";

/// A structured decision read from one model response.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Stop and return `final_text`.
    Answer { final_text: String },
    /// Run `tool` with `arguments`, then ask again.
    CallTool {
        tool: String,
        arguments: Map<String, Value>,
    },
}

impl Decision {
    /// Parse a raw model response as strict JSON.
    pub fn parse(raw: &str) -> std::result::Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ProtocolError::NotJson(e.to_string()))?;
        let Value::Object(mut object) = value else {
            return Err(ProtocolError::NotAnObject);
        };

        let tag = match object.get("decision") {
            Some(Value::String(tag)) => tag.trim().to_ascii_uppercase(),
            _ => return Err(ProtocolError::MissingDecision),
        };

        match tag.as_str() {
            ANSWER_TAG => {
                let final_text = match object.remove("final") {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(text)) => text,
                    Some(_) => return Err(ProtocolError::InvalidFinal),
                };
                Ok(Decision::Answer { final_text })
            }
            CALL_TOOL_TAG => {
                let tool = match object.remove("tool") {
                    Some(Value::String(tool)) => tool,
                    _ => return Err(ProtocolError::MissingTool),
                };
                let arguments = match object.remove("arguments") {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(arguments)) => arguments,
                    Some(_) => return Err(ProtocolError::InvalidArguments),
                };
                Ok(Decision::CallTool { tool, arguments })
            }
            _ => Err(ProtocolError::UnknownDecision(tag)),
        }
    }
}
