pub mod config_cmd;
pub mod history;
pub mod init;
pub mod run;
pub mod serve;
pub mod tools;

use std::path::{Path, PathBuf};

use agentic_config::AppConfig;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// The config file in effect: `--config` if given, else the default location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit);
    AppConfig::load_with_overrides(&path)
        .map_err(|e| format!("Failed to load config from {}: {e}", path.display()).into())
}
