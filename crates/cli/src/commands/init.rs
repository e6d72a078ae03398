//! `agentic init`: First-time setup.

use std::path::Path;

use agentic_config::AppConfig;

use super::{CmdResult, config_path};

pub async fn run(explicit: Option<&Path>) -> CmdResult {
    let path = config_path(explicit);

    if path.exists() {
        println!("Config already exists at: {}", path.display());
        println!("Edit it manually or delete it and re-run init.");
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(&path, AppConfig::default_toml()).await?;

    println!("Created {}", path.display());
    println!();
    println!("Next steps:");
    println!("   1. Pick a provider under [agent] (ollama needs no key)");
    println!("   2. Run: agentic run -m \"What is 2+2?\"");
    Ok(())
}
