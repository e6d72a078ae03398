//! Web search tool backed by SerpAPI's Google engine.

use std::time::Duration;

use agentic_core::error::ToolError;
use agentic_core::tool::{Tool, ToolContext};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::args::{optional_count, required_str};
use crate::http::{build_client, json_body, send};

pub const SERPAPI_URL: &str = "https://serpapi.com/search";
const DEFAULT_RESULTS: u64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SearchHit {
    title: Option<String>,
    link: Option<String>,
}

pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WebSearchTool {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ToolError> {
        Ok(Self {
            client: build_client("web_search", timeout)?,
            api_key: api_key.into(),
            base_url: SERPAPI_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

fn organic_hits(body: &Value, limit: usize) -> Vec<SearchHit> {
    body.get("organic_results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .take(limit)
                .map(|r| SearchHit {
                    title: r.get("title").and_then(Value::as_str).map(str::to_string),
                    link: r.get("link").and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Searches the web for information using SerpAPI."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The search query text" },
                "numResults": { "type": "integer", "default": DEFAULT_RESULTS }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        _context: &ToolContext,
        cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let query = required_str(arguments, "query")?;
        let num = optional_count(arguments, "numResults", DEFAULT_RESULTS);
        debug!(query, num, "Web search");

        let num_param = num.to_string();
        let request = self.client.get(&self.base_url).query(&[
            ("engine", "google"),
            ("q", query),
            ("num", num_param.as_str()),
            ("api_key", self.api_key.as_str()),
        ]);
        let response = send("web_search", request, cancel).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: format!("search API returned HTTP {}", status.as_u16()),
            });
        }

        let body = json_body("web_search", response, cancel).await?;
        let limit = usize::try_from(num).unwrap_or(usize::MAX);
        serde_json::to_value(organic_hits(&body, limit)).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason: e.to_string(),
        })
    }
}
