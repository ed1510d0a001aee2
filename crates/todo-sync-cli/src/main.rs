//! todo-sync - drive a remote todo list from the terminal.
//!
//! Every command fetches the list, runs one reconciliation action and prints
//! the list as the service confirmed it.

mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use todo_sync_config::{init_logging, Config};
use tracing::debug;

/// todo-sync command-line interface.
#[derive(Parser, Debug)]
#[command(name = "todo-sync")]
#[command(about = "Keep a todo list in sync with an async-job todo service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the todo service (overrides config and TODO_SYNC_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Config file. Defaults to the platform config dir (todo-sync/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the list
    List,
    /// Create a todo
    Add {
        /// Title of the new todo
        title: String,
    },
    /// Flip a todo between open and done
    Toggle {
        /// Todo id
        id: String,
    },
    /// Delete a todo
    Delete {
        /// Todo id
        id: String,
    },
    /// Re-read one todo from the service
    Show {
        /// Todo id
        id: String,
    },
    /// Print how many todos are still open
    Remaining,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::new()?,
    };

    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(&config.log_level);
    debug!(api_url = %config.api_url, "Configuration loaded");

    let command = cli.command.unwrap_or(Commands::List);
    commands::run(command, &config).await
}
