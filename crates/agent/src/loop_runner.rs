//! The decision loop: ask the model, run the tool it picks, repeat.
//!
//! One run works on a private copy of the session history (stored turns
//! plus the new instruction). Each step sends that history with a trailing
//! system turn describing the reply protocol and the available tools, then
//! reads the reply as a [`Decision`]. The run ends on an answer, a reply
//! that ignores the protocol, a request for an unknown tool, or when the
//! step budget is spent. Only then are the instruction and the answer
//! appended to the store.

use std::sync::Arc;

use agentic_core::agent::{Agent, AgentResult, AgentTask, ToolInvocation};
use agentic_core::decision::Decision;
use agentic_core::error::{Error, ProviderError, StoreError, ToolError};
use agentic_core::json::JsonCodec;
use agentic_core::memory::{ConversationStore, resolve_session};
use agentic_core::message::{ChatTurn, Role};
use agentic_core::provider::{ChatBackend, cancellable};
use agentic_core::tool::{Tool, ToolContext, ToolRegistry};
use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::prompt::StepPrompt;

/// Output when the step budget runs out before an answer.
pub const NO_ANSWER: &str = "No answer generated.";

pub const DEFAULT_MAX_STEPS: u32 = 8;
pub const DEFAULT_HISTORY_TURNS: usize = 20;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a tool-using assistant.";

pub fn unknown_tool_message(tool: &str) -> String {
    format!("Requested unknown tool '{tool}'.")
}

/// Tunables for [`ReactiveAgent`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOptions {
    /// Model calls allowed per run; never less than 1
    pub max_steps: u32,
    /// Sent as the system prompt on every backend call
    pub system_prompt: String,
    /// Stored turns loaded to seed each run
    pub history_turns: usize,
    /// Also append tool turns to the store, between the instruction and the answer
    pub persist_tool_turns: bool,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_turns: DEFAULT_HISTORY_TURNS,
            persist_tool_turns: false,
        }
    }
}

/// The tool-using agent.
///
/// Holds no per-run state, so one instance can serve many concurrent runs.
pub struct ReactiveAgent {
    backend: Arc<dyn ChatBackend>,
    tools: Arc<ToolRegistry>,
    store: Arc<dyn ConversationStore>,
    options: AgentOptions,
    codec: JsonCodec,
}

impl ReactiveAgent {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            backend,
            tools,
            store,
            options: AgentOptions::default(),
            codec: JsonCodec::COMPACT,
        }
    }

    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self.options.max_steps = self.options.max_steps.max(1);
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.options.max_steps = max_steps.max(1);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.options.system_prompt = prompt.into();
        self
    }

    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.options.history_turns = turns;
        self
    }

    pub fn with_persist_tool_turns(mut self, enabled: bool) -> Self {
        self.options.persist_tool_turns = enabled;
        self
    }

    pub fn with_codec(mut self, codec: JsonCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn backend(&self) -> &Arc<dyn ChatBackend> {
        &self.backend
    }

    async fn load_history(
        &self,
        session: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ChatTurn>, Error> {
        if self.options.history_turns == 0 {
            return Ok(Vec::new());
        }
        let read = async {
            self.store
                .read_recent(session, self.options.history_turns, cancel)
                .await?
                .try_collect::<Vec<_>>()
                .await
        };
        cancellable(cancel, read)
            .await
            .ok_or(Error::Cancelled)?
            .map_err(store_error)
    }

    async fn ask_model(
        &self,
        history: &[ChatTurn],
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        cancellable(
            cancel,
            self.backend
                .complete(&self.options.system_prompt, history, cancel),
        )
        .await
        .ok_or(Error::Cancelled)?
        .map_err(|e| match e {
            ProviderError::Cancelled => Error::Cancelled,
            other => Error::Provider(other),
        })
    }

    /// Run `tool`. Faults become `{"error": ...}` results so the model can
    /// react to them; cancellation aborts the run.
    async fn invoke_tool(
        &self,
        tool: &dyn Tool,
        arguments: &Map<String, Value>,
        context: &ToolContext,
        cancel: &CancellationToken,
    ) -> Result<Value, Error> {
        let outcome = cancellable(cancel, tool.execute(arguments, context, cancel))
            .await
            .ok_or(Error::Cancelled)?;
        match outcome {
            Ok(value) => Ok(value),
            Err(ToolError::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                warn!(tool = tool.name(), error = %e, "Tool failed; reporting error to the model");
                Ok(json!({ "error": e.to_string() }))
            }
        }
    }

    async fn persist(
        &self,
        session: &str,
        instruction: &str,
        tool_turns: &[ChatTurn],
        answer: &str,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let turns = std::iter::once((Role::User, instruction))
            .chain(tool_turns.iter().map(|t| (t.role, t.content.as_str())))
            .chain(std::iter::once((Role::Assistant, answer)));
        for (role, content) in turns {
            self.store
                .append(session, role, content, cancel)
                .await
                .map_err(store_error)?;
        }
        Ok(())
    }
}

fn store_error(err: StoreError) -> Error {
    match err {
        StoreError::Cancelled => Error::Cancelled,
        other => Error::Store(other),
    }
}

#[async_trait]
impl Agent for ReactiveAgent {
    async fn run(&self, task: AgentTask, cancel: CancellationToken) -> agentic_core::Result<AgentResult> {
        let session = resolve_session(task.session_id.as_deref()).to_string();
        info!(
            session = %session,
            backend = self.backend.name(),
            max_steps = self.options.max_steps,
            "Agent run started"
        );

        let mut history = self.load_history(&session, &cancel).await?;
        history.push(ChatTurn::user(task.instruction.as_str()));

        let step_prompt = StepPrompt::build(&self.tools, task.context.as_ref(), &self.codec)?;
        let context = ToolContext::new(self.store.clone(), session.clone());

        let mut steps: u32 = 0;
        let mut invocations: Vec<ToolInvocation> = Vec::new();
        let mut tool_turns: Vec<ChatTurn> = Vec::new();
        let mut final_text: Option<String> = None;

        while steps < self.options.max_steps && final_text.is_none() {
            steps += 1;

            history.push(ChatTurn::system(step_prompt.as_str()));
            let reply = self.ask_model(&history, &cancel).await;
            history.pop();
            let raw = reply?;
            debug!(step = steps, raw = %raw, "Model replied");

            let (tool_name, arguments) = match Decision::parse(&raw) {
                Ok(Decision::Answer { final_text: text }) => {
                    final_text = Some(text);
                    continue;
                }
                Ok(Decision::CallTool { tool, arguments }) => (tool, arguments),
                Err(e) => {
                    warn!(step = steps, error = %e, "Reply ignored the decision protocol; using it as the answer");
                    final_text = Some(raw.trim().to_string());
                    continue;
                }
            };

            let Some(tool) = self.tools.get(&tool_name) else {
                warn!(step = steps, tool = %tool_name, "Model requested an unknown tool");
                final_text = Some(unknown_tool_message(&tool_name));
                continue;
            };

            // The tool, the invocation record and the tool turn all see the
            // codec-normalized arguments.
            let arguments = match self.codec.to_value(&arguments)? {
                Value::Object(normalized) => normalized,
                _ => arguments,
            };

            debug!(step = steps, tool = tool.name(), "Calling tool");
            let result = self.invoke_tool(tool, &arguments, &context, &cancel).await?;
            let result = self.codec.to_value(&result)?;

            let turn = ChatTurn::tool(
                tool.name(),
                &self.codec.to_string(&arguments)?,
                &self.codec.to_string(&result)?,
            );
            if self.options.persist_tool_turns {
                tool_turns.push(turn.clone());
            }
            history.push(turn);
            invocations.push(ToolInvocation {
                tool_name: tool.name().to_string(),
                arguments,
                result,
            });
        }

        let output = final_text.unwrap_or_else(|| NO_ANSWER.to_string());
        self.persist(&session, &task.instruction, &tool_turns, &output, &cancel)
            .await?;

        info!(
            session = %session,
            steps,
            tool_calls = invocations.len(),
            "Agent run finished"
        );
        Ok(AgentResult {
            output,
            steps,
            tool_invocations: invocations,
        })
    }
}
