//! Built-in tools for the agentic decision loop.
//!
//! Every tool reports recoverable problems (bad paths, non-PDF downloads,
//! arithmetic errors) as an `{"error": ...}` payload so the model can see
//! them and try again. Tools that need external services are registered
//! only when those services are configured.

pub mod args;
pub mod calculator;
pub mod chroma_rag;
pub mod file_write;
mod http;
pub mod pdf_download;
pub mod session_history;
pub mod time_now;
pub mod web_search;
pub mod workspace;

use std::time::Duration;

use agentic_config::ToolsConfig;
use agentic_core::error::ToolError;
use agentic_core::tool::{Tool, ToolRegistry};
use tracing::{debug, info};

pub use calculator::CalculatorTool;
pub use chroma_rag::ChromaRagTool;
pub use file_write::FileWriteTool;
pub use pdf_download::PdfDownloadTool;
pub use session_history::SessionHistoryTool;
pub use time_now::TimeNowTool;
pub use web_search::WebSearchTool;
pub use workspace::{Workspace, WorkspaceError};

/// Build the registry of built-in tools for `config`.
///
/// `calculator`, `time_now`, `file_write`, `pdf_download` and
/// `session_history` are always present; `web_search` needs a SerpAPI key
/// and `chroma_rag` needs an MCP endpoint.
pub fn default_registry(config: &ToolsConfig) -> Result<ToolRegistry, ToolError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let workspace = Workspace::new(&config.workspace);

    let mut tools: Vec<Box<dyn Tool>> = vec![
        Box::new(CalculatorTool),
        Box::new(TimeNowTool),
        Box::new(FileWriteTool::new(workspace.clone())),
        Box::new(PdfDownloadTool::new(workspace, timeout)?),
        Box::new(SessionHistoryTool),
    ];

    match config.resolved_serpapi_key() {
        Some(key) => tools.push(Box::new(WebSearchTool::new(key, timeout)?)),
        None => debug!("No SerpAPI key; web_search disabled"),
    }
    match config.chroma_mcp_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => tools.push(Box::new(ChromaRagTool::new(url, timeout)?)),
        _ => debug!("No Chroma MCP endpoint; chroma_rag disabled"),
    }

    let registry = ToolRegistry::from_tools(tools)?;
    info!(tools = ?registry.names(), "Tool registry ready");
    Ok(registry)
}
