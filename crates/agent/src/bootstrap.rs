//! Wiring: turn an [`AppConfig`] into a ready-to-run agent.

use std::sync::Arc;

use agentic_config::{AgentConfig, AppConfig, MemoryConfig};
use agentic_core::error::{Error, StoreError};
use agentic_core::memory::ConversationStore;
use agentic_core::provider::ChatBackend;
use agentic_core::tool::ToolRegistry;
use agentic_memory::{
    FileConversationStore, InMemoryConversationStore, NullConversationStore,
    SqliteConversationStore,
};
use tracing::info;

use crate::loop_runner::{AgentOptions, ReactiveAgent};

/// File name of the SQLite database inside the memory directory.
pub const SQLITE_FILE: &str = "conversations.db";

/// Everything a surface (CLI, gateway) needs to serve tasks.
#[derive(Clone)]
pub struct AgentRuntime {
    pub agent: Arc<ReactiveAgent>,
    pub store: Arc<dyn ConversationStore>,
    pub tools: Arc<ToolRegistry>,
}

impl AgentRuntime {
    /// Assemble a runtime from already-built parts.
    pub fn from_parts(
        backend: Arc<dyn ChatBackend>,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn ConversationStore>,
        options: AgentOptions,
    ) -> Self {
        let agent = ReactiveAgent::new(backend, tools.clone(), store.clone()).with_options(options);
        Self {
            agent: Arc::new(agent),
            store,
            tools,
        }
    }

    /// Build the backend, store and tools named by `config`.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        config.validate().map_err(|e| Error::Config {
            message: e.to_string(),
        })?;

        let backend = agentic_providers::build_from_config(config)?;
        let store = build_store(&config.memory).await?;
        let tools = Arc::new(agentic_tools::default_registry(&config.tools)?);

        info!(
            provider = backend.name(),
            model = backend.model(),
            memory = store.name(),
            tools = tools.len(),
            "Agent runtime ready"
        );
        Ok(Self::from_parts(
            backend,
            tools,
            store,
            options_from_config(&config.agent),
        ))
    }
}

pub fn options_from_config(config: &AgentConfig) -> AgentOptions {
    AgentOptions {
        max_steps: config.max_steps,
        system_prompt: config.system_prompt.clone(),
        history_turns: config.history_turns,
        persist_tool_turns: config.persist_tool_turns,
    }
}

/// Open the conversation store selected by `memory.backend`.
pub async fn build_store(config: &MemoryConfig) -> Result<Arc<dyn ConversationStore>, Error> {
    let store: Arc<dyn ConversationStore> = match config.backend.to_ascii_lowercase().as_str() {
        "file" => Arc::new(FileConversationStore::new(&config.directory)),
        "sqlite" => {
            tokio::fs::create_dir_all(&config.directory)
                .await
                .map_err(|e| {
                    StoreError::Storage(format!(
                        "Failed to create {}: {e}",
                        config.directory.display()
                    ))
                })?;
            let path = config.directory.join(SQLITE_FILE);
            let url = format!("sqlite://{}", path.display());
            Arc::new(SqliteConversationStore::new(&url).await?)
        }
        "memory" => Arc::new(InMemoryConversationStore::new()),
        "none" => Arc::new(NullConversationStore),
        other => {
            return Err(Error::Config {
                message: format!("unknown memory backend '{other}'"),
            });
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentic_core::message::Role;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn default_config_builds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.memory.directory = dir.path().join("memory");
        config.tools.workspace = dir.path().join("ws");

        let runtime = AgentRuntime::from_config(&config).await.unwrap();
        assert_eq!(runtime.store.name(), "file");
        assert_eq!(runtime.agent.backend().name(), "ollama");
        assert_eq!(runtime.agent.options().max_steps, 8);
        assert!(runtime.tools.get("calculator").is_some());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        let err = AgentRuntime::from_config(&config).await.err().unwrap();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn every_memory_backend_opens() {
        let dir = tempfile::tempdir().unwrap();
        for backend in ["file", "sqlite", "memory", "none"] {
            let config = MemoryConfig {
                backend: backend.into(),
                directory: dir.path().join(backend),
            };
            let store = build_store(&config).await.unwrap();
            assert_eq!(store.name(), backend);
            store
                .append("s", Role::User, "hi", &CancellationToken::new())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn unknown_memory_backend_fails() {
        let config = MemoryConfig {
            backend: "redis".into(),
            directory: "x".into(),
        };
        assert!(build_store(&config).await.is_err());
    }

    #[test]
    fn options_follow_config() {
        let mut agent = AgentConfig::default();
        agent.max_steps = 3;
        agent.persist_tool_turns = true;
        let options = options_from_config(&agent);
        assert_eq!(options.max_steps, 3);
        assert!(options.persist_tool_turns);
        assert_eq!(options.system_prompt, "You are a tool-using assistant.");
    }
}
