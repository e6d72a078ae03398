//! `agentic tools`: List the tools the agent can call.

use std::path::Path;

use super::{CmdResult, load_config};

pub async fn run(config_path: Option<&Path>) -> CmdResult {
    let config = load_config(config_path)?;
    let registry = agentic_tools::default_registry(&config.tools)?;
    for spec in registry.list() {
        println!("{:<16} {}", spec.name, spec.description);
    }
    Ok(())
}
