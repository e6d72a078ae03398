//! Task submission types and the `Agent` trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

/// One unit of work submitted to an agent. Immutable once submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTask {
    /// What the user asked for
    pub instruction: String,

    /// Free-form key/value context shown to the model alongside the tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,

    /// Conversation to continue; `None` means the default session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AgentTask {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }
}

/// Record of one tool execution within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: Map<String, Value>,
    /// What the tool returned; may itself be an `{"error": ...}` payload
    pub result: Value,
}

/// The outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub output: String,
    /// Model calls made, between 1 and the configured step budget
    pub steps: u32,
    pub tool_invocations: Vec<ToolInvocation>,
}

/// Anything that can execute a task end to end.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(&self, task: AgentTask, cancel: CancellationToken) -> crate::Result<AgentResult>;
}
