//! Session history tool: Lets the agent look back at its own conversation.

use agentic_core::error::{StoreError, ToolError};
use agentic_core::tool::{Tool, ToolContext};
use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;

use crate::args::optional_count;

const DEFAULT_TURNS: u64 = 10;

pub struct SessionHistoryTool;

fn store_failure(err: StoreError) -> ToolError {
    match err {
        StoreError::Cancelled => ToolError::Cancelled,
        other => ToolError::ExecutionFailed {
            tool_name: "session_history".into(),
            reason: other.to_string(),
        },
    }
}

#[async_trait]
impl Tool for SessionHistoryTool {
    fn name(&self) -> &str {
        "session_history"
    }

    fn description(&self) -> &str {
        "Returns the most recent turns of the current conversation, oldest first."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "maxTurns": {
                    "type": "integer",
                    "description": "How many recent turns to return",
                    "default": DEFAULT_TURNS
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        context: &ToolContext,
        cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let max_turns = optional_count(arguments, "maxTurns", DEFAULT_TURNS);
        let max_turns = usize::try_from(max_turns).unwrap_or(usize::MAX);

        let turns: Vec<Value> = context
            .store()
            .read_recent(context.session_id(), max_turns, cancel)
            .await
            .map_err(store_failure)?
            .map_ok(|turn| json!({ "role": turn.role.as_str(), "content": turn.content }))
            .try_collect()
            .await
            .map_err(store_failure)?;

        Ok(json!({
            "session": context.session_id(),
            "turns": turns,
        }))
    }
}
