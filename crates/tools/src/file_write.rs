//! File write tool: Writes text into the configured workspace.

use agentic_core::error::ToolError;
use agentic_core::tool::{Tool, ToolContext};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::args::{error_payload, required_str};
use crate::workspace::Workspace;

pub struct FileWriteTool {
    workspace: Workspace,
}

impl FileWriteTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Writes text content to a file within the configured workspace. Returns the relative path."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "relativePath": {
                    "type": "string",
                    "description": "Destination path, relative to the workspace"
                },
                "content": {
                    "type": "string",
                    "description": "The text to write"
                }
            },
            "required": ["relativePath", "content"],
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        _context: &ToolContext,
        _cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let relative = required_str(arguments, "relativePath")?;
        let content = match arguments.get("content") {
            Some(Value::String(s)) => s.as_str(),
            Some(Value::Null) | None => "",
            Some(_) => {
                return Err(ToolError::InvalidArguments("'content' must be a string".into()));
            }
        };

        let full = match self.workspace.resolve(relative) {
            Ok(full) => full,
            Err(e) => return Ok(error_payload(e.to_string())),
        };
        if let Err(e) = self.workspace.prepare(&full).await {
            return Ok(error_payload(e.to_string()));
        }

        tokio::fs::write(&full, content)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "file_write".into(),
                reason: format!("Failed to write file: {e}"),
            })?;

        let path = self.workspace.display_relative(&full);
        debug!(path = %path, bytes = content.len(), "File written");
        Ok(json!({ "path": path, "size": content.len() }))
    }
}
