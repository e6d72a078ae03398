//! SQLite conversation store.
//!
//! One table, `turns`, holds every session. Rows are ordered by their
//! autoincrement id, which matches append order.

use std::str::FromStr;

use agentic_core::error::StoreError;
use agentic_core::memory::{ConversationStore, TurnStream};
use agentic_core::message::{ChatTurn, Role};
use agentic_core::provider::cancellable;
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::locks::SessionLocks;

pub struct SqliteConversationStore {
    pool: SqlitePool,
    locks: SessionLocks,
}

impl SqliteConversationStore {
    /// Open (or create) the database at `path`.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // Every connection to `:memory:` opens its own database, so an
        // in-memory store must stay on one connection that never expires.
        let pool_options = if path.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self::from_pool(pool).await?;
        info!("SQLite conversation store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self {
            pool,
            locks: SessionLocks::new(),
        };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id  TEXT NOT NULL,
                role        TEXT NOT NULL,
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("turns table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id, id)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("session index: {e}")))?;

        Ok(())
    }

    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Option<ChatTurn> {
        let role: String = row.try_get("role").ok()?;
        let content: String = row.try_get("content").ok()?;
        match role.parse::<Role>() {
            Ok(role) => Some(ChatTurn::new(role, content)),
            Err(e) => {
                warn!(error = %e, "Skipping turn with unknown role");
                None
            }
        }
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let gate = self.locks.gate(session_id);
        let _guard = cancellable(cancel, gate.lock())
            .await
            .ok_or(StoreError::Cancelled)?;

        sqlx::query(
            "INSERT INTO turns (session_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(session_id)
        .bind(role.as_str())
        .bind(content)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        Ok(())
    }

    async fn read_recent(
        &self,
        session_id: &str,
        max_turns: usize,
        cancel: &CancellationToken,
    ) -> Result<TurnStream, StoreError> {
        let limit = i64::try_from(max_turns).unwrap_or(i64::MAX);
        let query = sqlx::query(
            r#"
            SELECT role, content FROM (
                SELECT id, role, content FROM turns
                WHERE session_id = ?1
                ORDER BY id DESC
                LIMIT ?2
            ) ORDER BY id ASC
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool);

        let rows = cancellable(cancel, query)
            .await
            .ok_or(StoreError::Cancelled)?
            .map_err(|e| StoreError::QueryFailed(format!("Recent turns: {e}")))?;

        let turns: Vec<ChatTurn> = rows.iter().filter_map(Self::row_to_turn).collect();
        Ok(futures::stream::iter(turns.into_iter().map(Ok)).boxed())
    }
}
