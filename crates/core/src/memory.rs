//! ConversationStore trait: Durable per-session turn logs.
//!
//! A session is a plain string key. Its log is append-only and is created
//! implicitly by the first append; the core never deletes one.
//!
//! Implementations: JSONL files, SQLite, in-memory (for testing), none (no-op).

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;
use crate::message::{ChatTurn, Role};

/// Session used when a task does not name one.
pub const DEFAULT_SESSION: &str = "default";

/// Finite stream of turns, oldest first.
pub type TurnStream = BoxStream<'static, std::result::Result<ChatTurn, StoreError>>;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The backend name (e.g., "file", "sqlite", "none").
    fn name(&self) -> &str;

    /// Append one turn to the session's log.
    ///
    /// Appends to the same session are serialized; appends to different
    /// sessions may proceed in parallel.
    async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<(), StoreError>;

    /// The most recent `max_turns` turns of the session, oldest first.
    ///
    /// Unknown sessions yield an empty stream.
    async fn read_recent(
        &self,
        session_id: &str,
        max_turns: usize,
        cancel: &CancellationToken,
    ) -> std::result::Result<TurnStream, StoreError>;
}

/// Normalize a caller-supplied session id: blank means [`DEFAULT_SESSION`].
pub fn resolve_session(session_id: Option<&str>) -> &str {
    match session_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => DEFAULT_SESSION,
    }
}
