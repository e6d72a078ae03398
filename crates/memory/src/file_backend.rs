//! File-based conversation store: One JSON-lines log per session.
//!
//! Each session lives in `<directory>/<key>.jsonl`, where `<key>` is the
//! session id with everything but letters and digits removed. Each line
//! is `{"ts": ..., "role": ..., "content": ...}`, so multi-line content and
//! tabs survive a round trip. The directory is created on first append.

use std::path::{Path, PathBuf};

use agentic_core::error::StoreError;
use agentic_core::memory::{ConversationStore, DEFAULT_SESSION, TurnStream};
use agentic_core::message::{ChatTurn, Role};
use agentic_core::provider::cancellable;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::locks::SessionLocks;

#[derive(Debug, Serialize, Deserialize)]
struct LogLine {
    ts: DateTime<Utc>,
    role: Role,
    content: String,
}

pub struct FileConversationStore {
    directory: PathBuf,
    locks: SessionLocks,
}

impl FileConversationStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            locks: SessionLocks::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File stem for a session id. Distinct ids may share a stem
    /// (`"a-b"` and `"ab"`); they then share a log and a gate.
    pub fn session_key(session_id: &str) -> String {
        let key: String = session_id
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        if key.is_empty() {
            DEFAULT_SESSION.to_string()
        } else {
            key
        }
    }

    fn log_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.jsonl"))
    }

    async fn write_line(&self, path: &Path, line: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to create memory directory: {e}")))?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open {}: {e}", path.display())))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to append turn: {e}")))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to flush turn: {e}")))
    }
}

fn parse_log(content: &str, path: &Path) -> Vec<ChatTurn> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<LogLine>(line) {
            Ok(entry) => Some(ChatTurn::new(entry.role, entry.content)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping corrupted conversation line");
                None
            }
        })
        .collect()
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let key = Self::session_key(session_id);
        let path = self.log_path(&key);
        let mut line = serde_json::to_string(&LogLine {
            ts: Utc::now(),
            role,
            content: content.to_string(),
        })
        .map_err(|e| StoreError::Storage(format!("Failed to serialize turn: {e}")))?;
        line.push('\n');

        let gate = self.locks.gate(&key);
        let _guard = cancellable(cancel, gate.lock())
            .await
            .ok_or(StoreError::Cancelled)?;

        // Once the gate is held the write runs to completion, so a
        // cancelled run never leaves half a line behind.
        self.write_line(&path, &line).await?;
        debug!(session = %key, role = %role, "Turn appended");
        Ok(())
    }

    async fn read_recent(
        &self,
        session_id: &str,
        max_turns: usize,
        cancel: &CancellationToken,
    ) -> Result<TurnStream, StoreError> {
        let key = Self::session_key(session_id);
        let path = self.log_path(&key);
        let gate = self.locks.gate(&key);

        let content = cancellable(cancel, async {
            let _guard = gate.lock().await;
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => Ok(content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
                Err(e) => Err(StoreError::QueryFailed(format!(
                    "Failed to read {}: {e}",
                    path.display()
                ))),
            }
        })
        .await
        .ok_or(StoreError::Cancelled)??;

        let mut turns = parse_log(&content, &path);
        let skip = turns.len().saturating_sub(max_turns);
        turns.drain(..skip);
        Ok(futures::stream::iter(turns.into_iter().map(Ok)).boxed())
    }
}
