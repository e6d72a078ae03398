//! In-memory conversation store: Useful for testing and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Arc;

use agentic_core::error::StoreError;
use agentic_core::memory::{ConversationStore, TurnStream};
use agentic_core::message::{ChatTurn, Role};
use agentic_core::provider::cancellable;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Keeps every session's turns in a `Vec`, keyed by the raw session id.
#[derive(Default)]
pub struct InMemoryConversationStore {
    sessions: Arc<RwLock<HashMap<String, Vec<ChatTurn>>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every turn stored for `session_id`, oldest first.
    pub async fn snapshot(&self, session_id: &str) -> Vec<ChatTurn> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let mut sessions = cancellable(cancel, self.sessions.write())
            .await
            .ok_or(StoreError::Cancelled)?;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .push(ChatTurn::new(role, content));
        Ok(())
    }

    async fn read_recent(
        &self,
        session_id: &str,
        max_turns: usize,
        cancel: &CancellationToken,
    ) -> Result<TurnStream, StoreError> {
        let sessions = cancellable(cancel, self.sessions.read())
            .await
            .ok_or(StoreError::Cancelled)?;
        let turns = sessions.get(session_id).map(Vec::as_slice).unwrap_or_default();
        let tail = turns[turns.len().saturating_sub(max_turns)..].to_vec();
        Ok(futures::stream::iter(tail.into_iter().map(Ok)).boxed())
    }
}
