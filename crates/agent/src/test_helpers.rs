//! Shared test doubles for the decision loop.

use std::collections::VecDeque;
use std::sync::Mutex;

use agentic_core::error::{ProviderError, ToolError};
use agentic_core::message::ChatTurn;
use agentic_core::provider::{ChatBackend, cancellable};
use agentic_core::tool::{Tool, ToolContext};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;

/// What a [`ScriptedBackend`] does on one call.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(ProviderError),
    /// Never completes; only cancellation ends the call.
    Hang,
}

/// A backend that plays back a fixed script, one entry per call.
///
/// The last entry repeats once the script runs out. Every call's inputs are
/// recorded for inspection.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    calls: Mutex<Vec<(String, Vec<ChatTurn>)>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn texts<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|s| Reply::Text(s.into())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, Vec<ChatTurn>)> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Reply {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        match script.pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last.clone().expect("ScriptedBackend called with an empty script"),
        }
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), history.to_vec()));
        match self.next_reply() {
            Reply::Text(text) => Ok(text),
            Reply::Fail(err) => Err(err),
            Reply::Hang => cancellable(cancel, std::future::pending::<()>())
                .await
                .map(|_| String::new())
                .ok_or(ProviderError::Cancelled),
        }
    }
}

pub fn answer(text: &str) -> String {
    json!({"decision": "ANSWER", "final": text}).to_string()
}

pub fn call_tool(tool: &str, arguments: Value) -> String {
    json!({"decision": "CALL_TOOL", "tool": tool, "arguments": arguments}).to_string()
}

/// Returns `{"ok": true}` for any input.
pub struct NoopTool;

#[async_trait]
impl Tool for NoopTool {
    fn name(&self) -> &str {
        "noop"
    }

    fn description(&self) -> &str {
        "Does nothing"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(
        &self,
        _arguments: &Map<String, Value>,
        _context: &ToolContext,
        _cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        Ok(json!({"ok": true}))
    }
}

/// Fails every call: with [`ToolError::Cancelled`] when `cancelled` is set,
/// otherwise with an execution fault.
pub struct FailingTool {
    pub cancelled: bool,
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "flaky"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(
        &self,
        _arguments: &Map<String, Value>,
        _context: &ToolContext,
        _cancel: &CancellationToken,
    ) -> Result<Value, ToolError> {
        if self.cancelled {
            return Err(ToolError::Cancelled);
        }
        Err(ToolError::ExecutionFailed {
            tool_name: "flaky".into(),
            reason: "disk on fire".into(),
        })
    }
}
