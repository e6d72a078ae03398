//! Step instruction text shown to the model on every iteration.

use agentic_core::decision::{ANSWER_TAG, CALL_TOOL_TAG};
use agentic_core::json::JsonCodec;
use agentic_core::tool::ToolRegistry;
use serde_json::{Map, Value};

/// Tells the model the only two replies it may give.
pub fn protocol_statement() -> String {
    format!(
        "You can either {ANSWER_TAG} or {CALL_TOOL_TAG}.\n\
         To call a tool, reply with ONLY a single JSON object:\n\
         {{\"decision\":\"{CALL_TOOL_TAG}\",\"tool\":\"<tool_name>\",\"arguments\":{{...object per tool schema...}}}}\n\
         To answer, reply with ONLY:\n\
         {{\"decision\":\"{ANSWER_TAG}\",\"final\":\"<message>\"}}\n\
         No other text.\n\
         If you already have enough info, {ANSWER_TAG}. Otherwise, {CALL_TOOL_TAG}.\n\
         Available tools are listed below as JSON with name, description, and schema."
    )
}

/// The parts of the step instruction that stay fixed for a whole run.
#[derive(Debug, Clone)]
pub struct StepPrompt {
    text: String,
}

impl StepPrompt {
    /// Serialize the tool listing (and the task context, when non-empty) once.
    pub fn build(
        tools: &ToolRegistry,
        context: Option<&Map<String, Value>>,
        codec: &JsonCodec,
    ) -> serde_json::Result<Self> {
        let mut text = protocol_statement();
        text.push_str("\nTOOLS:\n");
        text.push_str(&codec.to_string(&tools.list())?);

        if let Some(context) = context.filter(|c| !c.is_empty()) {
            text.push_str("\nCONTEXT:\n");
            text.push_str(&codec.to_string(context)?);
        }
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
