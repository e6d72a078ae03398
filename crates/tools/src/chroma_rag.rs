//! Retrieval tool: Queries a Chroma collection through an MCP JSON-RPC endpoint.
//!
//! The request is a single `chroma.query` call. When the reply carries
//! `result.documents[0]` as an array, those documents are returned as a
//! flat list; otherwise `result` (or failing that, the whole reply) is
//! handed back unchanged.

use std::time::Duration;

use agentic_core::error::ToolError;
use agentic_core::tool::{Tool, ToolContext};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::args::{optional_count, required_str};
use crate::http::{build_client, json_body, send};

const DEFAULT_RESULTS: u64 = 3;

pub struct ChromaRagTool {
    client: reqwest::Client,
    endpoint: String,
}

impl ChromaRagTool {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ToolError> {
        Ok(Self {
            client: build_client("chroma_rag", timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

fn query_request(collection: &str, query: &str, n_results: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": uuid::Uuid::new_v4().to_string(),
        "method": "chroma.query",
        "params": {
            "collection": collection,
            "query_texts": [query],
            "n_results": n_results,
        }
    })
}

fn extract_documents(reply: Value) -> Value {
    let Value::Object(mut reply) = reply else {
        return reply;
    };
    let Some(result) = reply.remove("result") else {
        return Value::Object(reply);
    };
    match result.pointer("/documents/0") {
        Some(Value::Array(first)) => Value::Array(first.clone()),
        _ => result,
    }
}

#[async_trait]
impl Tool for ChromaRagTool {
    fn name(&self) -> &str {
        "chroma_rag"
    }

    fn description(&self) -> &str {
        "Queries a Chroma database (via MCP) for relevant documents."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "collection": { "type": "string", "description": "Chroma collection name" },
                "query": { "type": "string", "description": "Natural language query" },
                "nResults": { "type": "integer", "default": DEFAULT_RESULTS }
            },
            "required": ["collection", "query"],
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        _context: &ToolContext,
        cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        let collection = required_str(arguments, "collection")?;
        let query = required_str(arguments, "query")?;
        let n_results = optional_count(arguments, "nResults", DEFAULT_RESULTS);
        debug!(collection, n_results, "Chroma query");

        let request = self
            .client
            .post(&self.endpoint)
            .json(&query_request(collection, query, n_results));
        let response = send("chroma_rag", request, cancel).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "chroma_rag".into(),
                reason: format!("MCP endpoint returned HTTP {}", status.as_u16()),
            });
        }

        let reply = json_body("chroma_rag", response, cancel).await?;
        Ok(extract_documents(reply))
    }
}
