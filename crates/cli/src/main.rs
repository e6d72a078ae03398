//! agentic CLI, the main entry point.
//!
//! Commands:
//! - `run`      : Run one task, or chat interactively
//! - `serve`    : Start the HTTP gateway
//! - `tools`    : List the tools the agent can call
//! - `history`  : Show the stored turns of a session
//! - `init`     : Write a default config file
//! - `config`   : Show, locate or validate the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "agentic",
    about = "agentic: a tool-using LLM task runner",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of ~/.agentic/config.toml
    #[arg(long, global = true, env = "AGENTIC_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task; without --message, read tasks line by line from stdin
    Run {
        /// The instruction to run
        #[arg(short, long)]
        message: Option<String>,

        /// Session to continue
        #[arg(short, long)]
        session: Option<String>,

        /// Override agent.max_steps
        #[arg(long)]
        max_steps: Option<u32>,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List available tools
    Tools,

    /// Show recent turns of a session
    History {
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Number of turns to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Write a default config file
    Init,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: Option<commands::config_cmd::ConfigAction>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run {
            message,
            session,
            max_steps,
        } => commands::run::run(config_path, message, session, max_steps, cli.verbose).await?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Tools => commands::tools::run(config_path).await?,
        Commands::History { session, limit } => {
            commands::history::run(config_path, &session, limit).await?
        }
        Commands::Init => commands::init::run(config_path).await?,
        Commands::Config { action } => commands::config_cmd::run(config_path, action).await?,
    }

    Ok(())
}
