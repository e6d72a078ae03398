//! HTTP plumbing shared by the chat backends.

use std::time::Duration;

use agentic_core::error::ProviderError;
use agentic_core::message::ChatTurn;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A chat message in the `{role, content}` shape both OpenAI and Ollama accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// System prompt first (skipped when blank), then the history in order.
pub(crate) fn wire_messages(system_prompt: &str, history: &[ChatTurn]) -> Vec<WireMessage> {
    let system = (!system_prompt.trim().is_empty()).then(|| WireMessage {
        role: "system".into(),
        content: Some(system_prompt.to_string()),
    });
    system
        .into_iter()
        .chain(history.iter().map(|turn| WireMessage {
            role: turn.role.as_str().to_string(),
            content: Some(turn.content.clone()),
        }))
        .collect()
}

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Turn a non-success response into the matching error, consuming its body.
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!(provider, status, body = %body, "Provider returned error");
    match status {
        401 | 403 => ProviderError::AuthenticationFailed(format!(
            "{provider} rejected the credentials (status {status})"
        )),
        429 => ProviderError::RateLimited(body),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_leads() {
        let history = vec![ChatTurn::user("hi"), ChatTurn::system("step")];
        let msgs = wire_messages("be brief", &history);
        let roles: Vec<&str> = msgs.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "system"]);
        assert_eq!(msgs[0].content.as_deref(), Some("be brief"));
    }

    #[test]
    fn blank_system_prompt_is_omitted() {
        let msgs = wire_messages("  ", &[ChatTurn::user("hi")]);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].role, "user");
    }
}
