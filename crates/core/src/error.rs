//! Error types for the agentic domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! wraps them so callers can use `?` across crate boundaries.

use thiserror::Error;

/// The top-level error type for all agentic operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Chat backend errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Conversation store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Cancellation ---
    #[error("Run cancelled")]
    Cancelled,
}

impl Error {
    /// True when the error came from the run being cancelled at any layer.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Cancelled
                | Error::Provider(ProviderError::Cancelled)
                | Error::Store(StoreError::Cancelled)
                | Error::Tool(ToolError::Cancelled)
        )
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("Request cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Store operation cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Duplicate tool name: {0}")]
    DuplicateName(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution cancelled")]
    Cancelled,
}

/// Why a model response could not be read as a decision.
///
/// These never escape the decision loop: every variant is recovered by
/// treating the raw response text as the final answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing or non-string \"decision\" field")]
    MissingDecision,

    #[error("unknown decision tag: {0}")]
    UnknownDecision(String),

    #[error("\"final\" must be a string")]
    InvalidFinal,

    #[error("CALL_TOOL without a string \"tool\" field")]
    MissingTool,

    #[error("\"arguments\" must be a JSON object")]
    InvalidArguments,
}
