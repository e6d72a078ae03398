//! End-to-end tests: scripted model, real tools, real stores, real router.
//!
//! These exercise the full pipeline from a submitted task to the stored
//! history, without any network access to a model provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use agentic_agent::{AgentOptions, AgentRuntime, NO_ANSWER};
use agentic_config::ToolsConfig;
use agentic_core::agent::{Agent, AgentTask};
use agentic_core::error::ProviderError;
use agentic_core::memory::ConversationStore;
use agentic_core::message::{ChatTurn, Role};
use agentic_core::provider::ChatBackend;
use agentic_memory::{FileConversationStore, SqliteConversationStore};
use agentic_tools::default_registry;
use futures::TryStreamExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

// ── Scripted backend ─────────────────────────────────────────────────────

/// Plays back replies in order; the last one repeats.
struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    seen: Mutex<Vec<Vec<ChatTurn>>>,
}

impl ScriptedBackend {
    fn new(replies: &[String]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().cloned().collect()),
            last: Mutex::new(String::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn history_of_call(&self, n: usize) -> Vec<ChatTurn> {
        self.seen.lock().unwrap()[n].clone()
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "e2e_scripted"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        history: &[ChatTurn],
        _cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        self.seen.lock().unwrap().push(history.to_vec());
        let mut replies = self.replies.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = replies.pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

fn answer(text: &str) -> String {
    json!({"decision": "ANSWER", "final": text}).to_string()
}

fn call(tool: &str, arguments: Value) -> String {
    json!({"decision": "CALL_TOOL", "tool": tool, "arguments": arguments}).to_string()
}

struct Fixture {
    _dir: tempfile::TempDir,
    workspace: std::path::PathBuf,
    backend: Arc<ScriptedBackend>,
    runtime: AgentRuntime,
}

fn fixture(replies: &[String], options: AgentOptions) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let workspace = dir.path().join("workspace");
    let tools = default_registry(&ToolsConfig {
        workspace: workspace.clone(),
        ..ToolsConfig::default()
    })
    .unwrap();
    let store = Arc::new(FileConversationStore::new(dir.path().join("memory")));
    let backend = Arc::new(ScriptedBackend::new(replies));
    let runtime = AgentRuntime::from_parts(backend.clone(), Arc::new(tools), store, options);
    Fixture {
        _dir: dir,
        workspace,
        backend,
        runtime,
    }
}

async fn stored(store: &Arc<dyn ConversationStore>, session: &str) -> Vec<ChatTurn> {
    store
        .read_recent(session, 100, &CancellationToken::new())
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap()
}

// ── Decision loop ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_calculator_then_answer() {
    let f = fixture(
        &[call("calculator", json!({"expr": "2+2"})), answer("4")],
        AgentOptions::default(),
    );
    let result = f
        .runtime
        .agent
        .run(AgentTask::new("What is 2+2?"), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.output, "4");
    assert_eq!(result.steps, 2);
    assert_eq!(result.tool_invocations.len(), 1);
    assert_eq!(result.tool_invocations[0].tool_name, "calculator");
    assert_eq!(result.tool_invocations[0].result["result"], 4);

    assert_eq!(
        stored(&f.runtime.store, "default").await,
        vec![ChatTurn::user("What is 2+2?"), ChatTurn::assistant("4")]
    );
}

#[tokio::test]
async fn e2e_file_write_lands_in_workspace() {
    let f = fixture(
        &[
            call(
                "file_write",
                json!({"relativePath": "out/report.txt", "content": "all good"}),
            ),
            answer("written"),
        ],
        AgentOptions::default(),
    );
    let result = f
        .runtime
        .agent
        .run(AgentTask::new("write a report"), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.output, "written");
    assert_eq!(
        result.tool_invocations[0].result,
        json!({"path": "out/report.txt", "size": 8})
    );
    assert_eq!(
        std::fs::read_to_string(f.workspace.join("out/report.txt")).unwrap(),
        "all good"
    );
}

#[tokio::test]
async fn e2e_workspace_escape_is_reported_not_fatal() {
    let f = fixture(
        &[
            call("file_write", json!({"relativePath": "../../etc/x", "content": "no"})),
            answer("could not write"),
        ],
        AgentOptions::default(),
    );
    let result = f
        .runtime
        .agent
        .run(AgentTask::new("escape"), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.output, "could not write");
    assert_eq!(
        result.tool_invocations[0].result,
        json!({"error": "path escapes workspace"})
    );
    // The model saw the error on its second call.
    let second = f.backend.history_of_call(1);
    assert!(second.iter().any(|t| t.role == Role::Tool
        && t.content.contains("path escapes workspace")));
}

#[tokio::test]
async fn e2e_step_budget_exhaustion() {
    let f = fixture(
        &[call("time_now", json!({}))],
        AgentOptions {
            max_steps: 3,
            ..AgentOptions::default()
        },
    );
    let result = f
        .runtime
        .agent
        .run(AgentTask::new("what time is it, forever"), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.output, NO_ANSWER);
    assert_eq!(result.steps, 3);
    assert_eq!(result.tool_invocations.len(), 3);
    assert_eq!(f.backend.calls(), 3);
}

#[tokio::test]
async fn e2e_session_history_tool_sees_earlier_runs() {
    let f = fixture(
        &[
            answer("Paris"),
            call("session_history", json!({"maxTurns": 2})),
            answer("You asked about France."),
        ],
        AgentOptions::default(),
    );
    let agent = &f.runtime.agent;
    agent
        .run(
            AgentTask::new("Capital of France?").with_session("trip"),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    let result = agent
        .run(
            AgentTask::new("What did I ask?").with_session("trip"),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        result.tool_invocations[0].result["turns"],
        json!([
            {"role": "user", "content": "Capital of France?"},
            {"role": "assistant", "content": "Paris"}
        ])
    );
    assert_eq!(stored(&f.runtime.store, "trip").await.len(), 4);
}

#[tokio::test]
async fn e2e_sessions_are_isolated() {
    let f = fixture(&[answer("a"), answer("b")], AgentOptions::default());
    let agent = &f.runtime.agent;
    agent
        .run(AgentTask::new("one").with_session("alpha"), CancellationToken::new())
        .await
        .unwrap();
    agent
        .run(AgentTask::new("two").with_session("beta"), CancellationToken::new())
        .await
        .unwrap();

    // The beta run saw only its own instruction plus the step prompt.
    assert_eq!(f.backend.history_of_call(1).len(), 2);
    assert_eq!(stored(&f.runtime.store, "alpha").await.len(), 2);
    assert_eq!(stored(&f.runtime.store, "beta").await.len(), 2);
}

#[tokio::test]
async fn e2e_concurrent_runs_share_one_session_log() {
    let f = fixture(&[answer("ok")], AgentOptions::default());
    let mut handles = Vec::new();
    for i in 0..8 {
        let agent = f.runtime.agent.clone();
        handles.push(tokio::spawn(async move {
            agent
                .run(
                    AgentTask::new(format!("task {i}")).with_session("busy"),
                    CancellationToken::new(),
                )
                .await
                .unwrap()
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap().output, "ok");
    }
    assert_eq!(stored(&f.runtime.store, "busy").await.len(), 16);
}

#[tokio::test]
async fn e2e_sqlite_store_round_trip() {
    let store = Arc::new(SqliteConversationStore::new("sqlite::memory:").await.unwrap());
    let backend = Arc::new(ScriptedBackend::new(&[answer("stored")]));
    let tools = default_registry(&ToolsConfig::default()).unwrap();
    let runtime = AgentRuntime::from_parts(backend, Arc::new(tools), store, AgentOptions::default());

    runtime
        .agent
        .run(AgentTask::new("remember me").with_session("db"), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        stored(&runtime.store, "db").await,
        vec![ChatTurn::user("remember me"), ChatTurn::assistant("stored")]
    );
}

// ── HTTP surface ─────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_gateway_runs_task_and_serves_history() {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let f = fixture(
        &[call("calculator", json!({"expr": "6*7"})), answer("42")],
        AgentOptions::default(),
    );
    let app = agentic_gateway::build_router(Arc::new(agentic_gateway::ApiV1State {
        runtime: f.runtime.clone(),
        api_token: None,
    }));

    let req = Request::builder()
        .method("POST")
        .uri("/v1/agent/run")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"instruction": "6 times 7?", "session_id": "http"}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["output"], "42");
    assert_eq!(body["steps"], 2);
    assert_eq!(body["tool_invocations"][0]["result"]["result"], 42);

    let req = Request::builder()
        .uri("/v1/sessions/http/turns")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body["turns"],
        json!([
            {"role": "user", "content": "6 times 7?"},
            {"role": "assistant", "content": "42"}
        ])
    );
}
