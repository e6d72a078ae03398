//! Shared HTTP client setup for network-backed tools.

use std::time::Duration;

use agentic_core::error::ToolError;
use agentic_core::provider::cancellable;
use tokio_util::sync::CancellationToken;

pub(crate) fn build_client(tool_name: &str, timeout: Duration) -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: format!("failed to build HTTP client: {e}"),
        })
}

/// Send `request`, giving up with [`ToolError::Cancelled`] if `cancel` fires first.
pub(crate) async fn send(
    tool_name: &str,
    request: reqwest::RequestBuilder,
    cancel: &CancellationToken,
) -> Result<reqwest::Response, ToolError> {
    cancellable(cancel, request.send())
        .await
        .ok_or(ToolError::Cancelled)?
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: format!("request failed: {e}"),
        })
}

/// Read the whole body as JSON, racing `cancel`.
pub(crate) async fn json_body(
    tool_name: &str,
    response: reqwest::Response,
    cancel: &CancellationToken,
) -> Result<serde_json::Value, ToolError> {
    cancellable(cancel, response.json::<serde_json::Value>())
        .await
        .ok_or(ToolError::Cancelled)?
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: format!("invalid JSON response: {e}"),
        })
}
