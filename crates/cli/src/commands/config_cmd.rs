//! `agentic config`: Configuration inspection.

use std::path::Path;

use clap::Subcommand;

use super::{CmdResult, config_path, load_config};

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML (default)
    Show,
    /// Print the config file location
    Path,
    /// Check the configuration and report problems
    Validate,
}

pub async fn run(explicit: Option<&Path>, action: Option<ConfigAction>) -> CmdResult {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = load_config(explicit)?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => println!("{}", config_path(explicit).display()),
        ConfigAction::Validate => validate(explicit)?,
    }
    Ok(())
}

fn validate(explicit: Option<&Path>) -> CmdResult {
    let config = load_config(explicit)?;
    println!("Config OK");

    let provider = config.agent.provider.to_ascii_lowercase();
    let needs_key = provider != "ollama";
    let has_key = config
        .providers
        .get(&provider)
        .and_then(|p| p.resolved_api_key())
        .is_some();
    if needs_key && !has_key {
        println!("   warning: provider '{provider}' has no API key");
    }

    println!("   Provider:  {provider}");
    println!(
        "   Model:     {}",
        config.effective_model().unwrap_or_else(|| "(provider default)".into())
    );
    println!("   Max steps: {}", config.agent.max_steps);
    println!("   Memory:    {} ({})", config.memory.backend, config.memory.directory.display());
    println!("   Workspace: {}", config.tools.workspace.display());
    println!("   Gateway:   {}:{}", config.gateway.host, config.gateway.port);
    Ok(())
}
