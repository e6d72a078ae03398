//! `/v1` API: run tasks, list tools, read session history.

use std::sync::Arc;

use agentic_agent::AgentRuntime;
use agentic_core::agent::{Agent, AgentResult, AgentTask};
use agentic_core::error::Error;
use agentic_core::message::ChatTurn;
use agentic_core::tool::ToolSpec;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Turns returned by the history endpoint when no `limit` is given.
const DEFAULT_TURN_LIMIT: usize = 20;
const MAX_TURN_LIMIT: usize = 500;

pub struct ApiV1State {
    pub runtime: AgentRuntime,
    /// Bearer token required on every `/v1` route; `None` disables auth
    pub api_token: Option<String>,
}

pub type SharedApiState = Arc<ApiV1State>;

pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/agent/run", post(run_handler))
        .route("/tools", get(list_tools_handler))
        .route("/sessions/{id}/turns", get(session_turns_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps a run failure to a status code and `{"error": ...}` body.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Provider(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = status.as_u16(), error = %self.0, "v1 request failed");
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub instruction: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
}

async fn run_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<RunRequest>,
) -> Result<Json<AgentResult>, ApiError> {
    info!(session = ?payload.session_id, "v1/agent/run request");

    let task = AgentTask {
        instruction: payload.instruction,
        context: payload.context,
        session_id: payload.session_id,
    };

    // Dropping the handler (client went away) cancels the run.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = state.runtime.agent.run(task, cancel).await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
struct ToolListResponse {
    tools: Vec<ToolSpec>,
    count: usize,
}

async fn list_tools_handler(State(state): State<SharedApiState>) -> Json<ToolListResponse> {
    let tools = state.runtime.tools.list();
    Json(ToolListResponse {
        count: tools.len(),
        tools,
    })
}

#[derive(Debug, Deserialize)]
struct TurnsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TurnsResponse {
    session_id: String,
    turns: Vec<ChatTurn>,
}

async fn session_turns_handler(
    State(state): State<SharedApiState>,
    Path(session_id): Path<String>,
    Query(query): Query<TurnsQuery>,
) -> Result<Json<TurnsResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TURN_LIMIT)
        .min(MAX_TURN_LIMIT);
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let turns: Vec<ChatTurn> = state
        .runtime
        .store
        .read_recent(&session_id, limit, &cancel)
        .await
        .map_err(Error::from)?
        .try_collect()
        .await
        .map_err(Error::from)?;

    Ok(Json(TurnsResponse { session_id, turns }))
}
