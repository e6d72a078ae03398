//! `agentic serve`: Start the HTTP API server.

use std::path::Path;

use super::{CmdResult, load_config};

pub async fn run(config_path: Option<&Path>, port_override: Option<u16>) -> CmdResult {
    let mut config = load_config(config_path)?;
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    eprintln!("agentic gateway");
    eprintln!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    eprintln!("   Auth:      {}", if config.gateway.api_token.is_some() { "bearer token" } else { "none" });

    agentic_gateway::start(config).await
}
