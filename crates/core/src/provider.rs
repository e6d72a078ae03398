//! ChatBackend trait: The abstraction over LLM completion endpoints.
//!
//! A backend takes a system prompt plus an ordered conversation and returns
//! one completion string. The decision loop never learns which provider is
//! active; selection happens once at startup.
//!
//! Implementations: OpenAI-compatible (OpenAI, Groq) and Ollama.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;
use crate::message::ChatTurn;

/// Sampling temperature sent by every built-in backend.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// The model this backend sends requests to.
    fn model(&self) -> &str;

    /// Produce a single completion for `history`, prefixed by `system_prompt`.
    ///
    /// Implementations must return [`ProviderError::Cancelled`] promptly once
    /// `cancel` fires, and must fail on a non-success HTTP status or a
    /// response body that does not carry completion text.
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        cancel: &CancellationToken,
    ) -> std::result::Result<String, ProviderError>;
}

/// Race `fut` against `cancel`. Returns `None` if the token fires first.
pub async fn cancellable<F>(cancel: &CancellationToken, fut: F) -> Option<F::Output>
where
    F: std::future::Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}
