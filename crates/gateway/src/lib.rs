//! HTTP API gateway for agentic.
//!
//! Exposes a health check and the `/v1` API for running tasks, listing
//! tools and reading session history. Built on Axum.

pub mod api_v1;

use std::sync::Arc;

use agentic_agent::AgentRuntime;
use agentic_config::{AppConfig, resolve_secret};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

pub use api_v1::{ApiV1State, SharedApiState};

/// Request bodies larger than this are refused.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Build the full router: `/health` plus the `/v1` API.
///
/// Layers applied:
/// - Bearer token authentication on all /v1 routes (when a token is set)
/// - Request body size limit (1 MB)
/// - Permissive CORS for GET/POST
/// - HTTP trace logging
pub fn build_router(state: SharedApiState) -> Router {
    let v1 = api_v1::v1_router(state.clone())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server on `config.gateway.host:port`.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let runtime = AgentRuntime::from_config(&config).await?;
    let api_token = resolve_secret(config.gateway.api_token.as_deref(), |name| {
        std::env::var(name).ok()
    });
    if api_token.is_none() {
        warn!("No gateway.api_token set; /v1 is open to anyone who can reach {addr}");
    }

    let app = build_router(Arc::new(ApiV1State { runtime, api_token }));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn auth_middleware(
    State(state): State<SharedApiState>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(next.run(req).await),
        _ => {
            warn!("Unauthorized request to /v1 API: missing or invalid bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
