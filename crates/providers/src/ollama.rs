//! Native Ollama chat backend (`POST {host}/api/chat`, non-streaming).

use std::time::Duration;

use agentic_core::error::ProviderError;
use agentic_core::message::ChatTurn;
use agentic_core::provider::{ChatBackend, DEFAULT_TEMPERATURE, cancellable};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::http::{WireMessage, build_client, status_error, transport_error, wire_messages};

pub const OLLAMA_DEFAULT_HOST: &str = "http://localhost:11434";
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.1:8b-instruct-q8_0";

pub struct OllamaBackend {
    host: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(
        host: Option<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let host = host.unwrap_or_else(|| OLLAMA_DEFAULT_HOST.into());
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            model: model.unwrap_or_else(|| OLLAMA_DEFAULT_MODEL.into()),
            client: build_client(timeout)?,
        })
    }

    async fn send(&self, system_prompt: &str, history: &[ChatTurn]) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.host);
        let body = ChatRequest {
            model: &self.model,
            messages: wire_messages(system_prompt, history),
            stream: false,
            options: Options {
                temperature: DEFAULT_TEMPERATURE,
            },
        };

        debug!(provider = "ollama", model = %self.model, turns = history.len(), "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error("ollama", response).await);
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        reply
            .message
            .map(|m| m.content.unwrap_or_default())
            .ok_or_else(|| ProviderError::InvalidResponse("response has no message".into()))
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        cancellable(cancel, self.send(system_prompt, history))
            .await
            .ok_or(ProviderError::Cancelled)?
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<WireMessage>,
}
