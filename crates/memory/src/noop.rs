//! No-op conversation store: Disables persistent history entirely.

use agentic_core::error::StoreError;
use agentic_core::memory::{ConversationStore, TurnStream};
use agentic_core::message::Role;
use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

/// Accepts every append and remembers nothing.
pub struct NullConversationStore;

#[async_trait]
impl ConversationStore for NullConversationStore {
    fn name(&self) -> &str {
        "none"
    }

    async fn append(
        &self,
        _session_id: &str,
        _role: Role,
        _content: &str,
        _cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn read_recent(
        &self,
        _session_id: &str,
        _max_turns: usize,
        _cancel: &CancellationToken,
    ) -> Result<TurnStream, StoreError> {
        Ok(futures::stream::empty().boxed())
    }
}
