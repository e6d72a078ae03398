//! OpenAI-compatible chat backend.
//!
//! Works with OpenAI, Groq, and any endpoint exposing
//! `POST {base_url}/chat/completions` with bearer authentication.

use std::time::Duration;

use agentic_core::error::ProviderError;
use agentic_core::message::ChatTurn;
use agentic_core::provider::{ChatBackend, DEFAULT_TEMPERATURE, cancellable};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::http::{WireMessage, build_client, status_error, transport_error, wire_messages};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

pub struct OpenAiCompatBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: build_client(timeout)?,
        })
    }

    /// OpenAI, with `gpt-4o-mini` unless a model is given.
    pub fn openai(
        api_key: impl Into<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Self::new(
            "openai",
            OPENAI_BASE_URL,
            api_key,
            model.unwrap_or_else(|| OPENAI_DEFAULT_MODEL.into()),
            timeout,
        )
    }

    /// Groq's OpenAI-compatible endpoint, with `llama-3.1-8b-instant`
    /// unless a model is given.
    pub fn groq(
        api_key: impl Into<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Self::new(
            "groq",
            GROQ_BASE_URL,
            api_key,
            model.unwrap_or_else(|| GROQ_DEFAULT_MODEL.into()),
            timeout,
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, system_prompt: &str, history: &[ChatTurn]) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            temperature: DEFAULT_TEMPERATURE,
            messages: wire_messages(system_prompt, history),
        }
    }

    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(system_prompt, history);

        debug!(provider = %self.name, model = %self.model, turns = history.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(&self.name, response).await);
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.name
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

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    temperature: f32,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: WireMessage,
}
