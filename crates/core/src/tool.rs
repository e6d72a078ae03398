//! Tool trait: The abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world:
//! evaluate arithmetic, write files, search the web, and so on.
//! The model picks a tool by name; the registry resolves that name
//! case-insensitively.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;
use crate::memory::ConversationStore;

/// What a tool is shown of the world while it runs.
///
/// Only the conversation store and the id of the session being served.
#[derive(Clone)]
pub struct ToolContext {
    store: Arc<dyn ConversationStore>,
    session_id: String,
}

impl ToolContext {
    pub fn new(store: Arc<dyn ConversationStore>, session_id: impl Into<String>) -> Self {
        Self {
            store,
            session_id: session_id.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("store", &self.store.name())
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// A tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's arguments
    pub schema: Value,
}

/// The core Tool trait.
///
/// Recoverable failures (bad input, remote service said no) should come back
/// as an `Ok` value shaped like `{"error": "..."}` so the model can read them.
/// `Err` is for faults the tool cannot describe as a result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator", "file_write").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the model-supplied arguments.
    async fn execute(
        &self,
        arguments: &Map<String, Value>,
        context: &ToolContext,
        cancel: &CancellationToken,
    ) -> std::result::Result<Value, ToolError>;

    fn to_spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            schema: self.parameters_schema(),
        }
    }
}

/// The active set of tools.
///
/// Immutable once handed to the decision loop; share it behind an `Arc`.
/// Listing order is registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a collection of tools, rejecting duplicates.
    pub fn from_tools<I>(tools: I) -> std::result::Result<Self, ToolError>
    where
        I: IntoIterator<Item = Box<dyn Tool>>,
    {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool.
    ///
    /// Names are compared case-insensitively; a second tool whose name
    /// collides with an existing one is rejected with
    /// [`ToolError::DuplicateName`].
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let key = normalize(tool.name());
        if self.index.contains_key(&key) {
            return Err(ToolError::DuplicateName(tool.name().to_string()));
        }
        self.index.insert(key, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index
            .get(&normalize(name))
            .map(|&i| self.tools[i].as_ref())
    }

    /// Name, description and schema of every tool, in registration order.
    pub fn list(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.to_spec()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::TurnStream;
    use crate::message::Role;
    use futures::StreamExt;

    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: &Map<String, Value>,
            context: &ToolContext,
            _cancel: &CancellationToken,
        ) -> std::result::Result<Value, ToolError> {
            Ok(serde_json::json!({
                "text": arguments.get("text").cloned().unwrap_or(Value::Null),
                "session": context.session_id(),
            }))
        }
    }

    struct EmptyStore;

    #[async_trait]
    impl ConversationStore for EmptyStore {
        fn name(&self) -> &str {
            "empty"
        }
        async fn append(
            &self,
            _session_id: &str,
            _role: Role,
            _content: &str,
            _cancel: &CancellationToken,
        ) -> std::result::Result<(), StoreError> {
            Ok(())
        }
        async fn read_recent(
            &self,
            _session_id: &str,
            _max_turns: usize,
            _cancel: &CancellationToken,
        ) -> std::result::Result<TurnStream, StoreError> {
            Ok(futures::stream::empty().boxed())
        }
    }

    fn echo(name: &'static str) -> Box<dyn Tool> {
        Box::new(EchoTool { name })
    }

    #[test]
    fn lookup_ignores_case() {
        let registry = ToolRegistry::from_tools([echo("Calculator")]).unwrap();
        assert!(registry.get("calculator").is_some());
        assert!(registry.get("CALCULATOR").is_some());
        assert!(registry.get("cAlCuLaToR").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ToolRegistry::from_tools([echo("echo"), echo("ECHO")])
            .err()
            .expect("duplicate should fail");
        assert!(matches!(err, ToolError::DuplicateName(ref n) if n == "ECHO"));
    }

    #[test]
    fn list_preserves_registration_order() {
        let registry =
            ToolRegistry::from_tools([echo("zeta"), echo("alpha"), echo("mid")]).unwrap();
        let names: Vec<String> = registry.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn spec_carries_schema() {
        let registry = ToolRegistry::from_tools([echo("echo")]).unwrap();
        let spec = &registry.list()[0];
        assert_eq!(spec.description, "Echoes back the input");
        assert_eq!(spec.schema["required"][0], "text");
    }

    #[tokio::test]
    async fn execute_sees_context_session() {
        let registry = ToolRegistry::from_tools([echo("echo")]).unwrap();
        let ctx = ToolContext::new(Arc::new(EmptyStore), "s1");
        let mut args = Map::new();
        args.insert("text".into(), Value::from("hello"));
        let out = registry
            .get("Echo")
            .unwrap()
            .execute(&args, &ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out["text"], "hello");
        assert_eq!(out["session"], "s1");
    }
}
