//! `agentic history`: Print the stored turns of a session.

use std::path::Path;

use agentic_core::message::ChatTurn;
use futures::TryStreamExt;
use tokio_util::sync::CancellationToken;

use super::{CmdResult, load_config};

pub async fn run(config_path: Option<&Path>, session: &str, limit: usize) -> CmdResult {
    let config = load_config(config_path)?;
    let store = agentic_agent::build_store(&config.memory).await?;

    let turns: Vec<ChatTurn> = store
        .read_recent(session, limit, &CancellationToken::new())
        .await?
        .try_collect()
        .await?;

    if turns.is_empty() {
        eprintln!("No turns stored for session '{session}' ({} store)", store.name());
    }
    for turn in turns {
        println!("[{}] {}", turn.role, turn.content);
    }
    Ok(())
}
