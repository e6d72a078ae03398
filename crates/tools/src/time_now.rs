//! Clock tool: Current time in UTC and in the host's local zone.

use agentic_core::error::ToolError;
use agentic_core::tool::{Tool, ToolContext};
use async_trait::async_trait;
use chrono::{Local, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;

pub struct TimeNowTool;

#[async_trait]
impl Tool for TimeNowTool {
    fn name(&self) -> &str {
        "time_now"
    }

    fn description(&self) -> &str {
        "Returns the current UTC and local time for the system."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        _arguments: &Map<String, Value>,
        _context: &ToolContext,
        _cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let now = Utc::now();
        Ok(json!({
            "utc": now.to_rfc3339_opts(SecondsFormat::Secs, true),
            "local": now.with_timezone(&Local).to_rfc3339_opts(SecondsFormat::Secs, false),
        }))
    }
}
