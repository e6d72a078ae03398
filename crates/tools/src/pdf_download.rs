//! PDF download tool: Fetches a PDF into the workspace.

use std::time::Duration;

use agentic_core::error::ToolError;
use agentic_core::provider::cancellable;
use agentic_core::tool::{Tool, ToolContext};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::args::{error_payload, optional_str};
use crate::http::{build_client, send};
use crate::workspace::Workspace;

const FALLBACK_FILE_NAME: &str = "download.pdf";

pub struct PdfDownloadTool {
    client: reqwest::Client,
    workspace: Workspace,
}

impl PdfDownloadTool {
    pub fn new(workspace: Workspace, timeout: Duration) -> Result<Self, ToolError> {
        Ok(Self {
            client: build_client("pdf_download", timeout)?,
            workspace,
        })
    }
}

/// Last path segment of `url`, or `download.pdf` when there is none.
fn file_name_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

fn is_pdf(response: &reqwest::Response) -> bool {
    match response.headers().get(reqwest::header::CONTENT_TYPE) {
        Some(value) => value
            .to_str()
            .map(|ct| ct.to_ascii_lowercase().contains("pdf"))
            .unwrap_or(false),
        None => true,
    }
}

#[async_trait]
impl Tool for PdfDownloadTool {
    fn name(&self) -> &str {
        "pdf_download"
    }

    fn description(&self) -> &str {
        "Downloads a PDF from a URL to a file inside the configured workspace."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the PDF to download"
                },
                "relativePath": {
                    "type": "string",
                    "description": "Optional relative path to save the PDF under the workspace"
                }
            },
            "required": ["url"],
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        _context: &ToolContext,
        cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let Some(raw_url) = optional_str(arguments, "url") else {
            return Ok(error_payload("url is required"));
        };
        let url = match reqwest::Url::parse(raw_url.trim()) {
            Ok(url) => url,
            Err(e) => return Ok(error_payload(format!("invalid url: {e}"))),
        };

        let relative = optional_str(arguments, "relativePath")
            .map(str::to_string)
            .unwrap_or_else(|| file_name_from_url(&url));
        let full = match self.workspace.resolve(&relative) {
            Ok(full) => full,
            Err(e) => return Ok(error_payload(e.to_string())),
        };
        if let Err(e) = self.workspace.prepare(&full).await {
            return Ok(error_payload(e.to_string()));
        }

        debug!(url = %url, "Downloading PDF");
        let response = send("pdf_download", self.client.get(url.clone()), cancel).await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(error_payload(format!("HTTP {}", status.as_u16())));
        }
        if !is_pdf(&response) {
            return Ok(error_payload("URL does not point to a PDF"));
        }

        let bytes = cancellable(cancel, response.bytes())
            .await
            .ok_or(ToolError::Cancelled)?
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "pdf_download".into(),
                reason: format!("failed to read body: {e}"),
            })?;
        tokio::fs::write(&full, &bytes)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "pdf_download".into(),
                reason: format!("failed to save PDF: {e}"),
            })?;

        let path = self.workspace.display_relative(&full);
        info!(url = %url, path = %path, bytes = bytes.len(), "PDF saved");
        Ok(json!({ "path": path, "size": bytes.len() }))
    }
}
