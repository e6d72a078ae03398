//! # agentic core
//!
//! Domain types, traits, and error definitions for the agentic task runner.
//! Everything the decision loop talks to is a trait defined here:
//! [`ChatBackend`] for the model, [`Tool`] for capabilities and
//! [`ConversationStore`] for session history. Implementations live in
//! their own crates, so backends and stores can be swapped by
//! configuration and replaced with scripted doubles in tests.

pub mod agent;
pub mod decision;
pub mod error;
pub mod json;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{Agent, AgentResult, AgentTask, ToolInvocation};
pub use decision::Decision;
pub use error::{Error, ProtocolError, ProviderError, Result, StoreError, ToolError};
pub use json::JsonCodec;
pub use memory::{ConversationStore, DEFAULT_SESSION, TurnStream, resolve_session};
pub use message::{ChatTurn, Role};
pub use provider::{ChatBackend, cancellable};
pub use tool::{Tool, ToolContext, ToolRegistry, ToolSpec};

pub use tokio_util::sync::CancellationToken;
