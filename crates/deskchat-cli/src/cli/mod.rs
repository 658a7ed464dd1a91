//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use deskchat_core::config::Config;

mod commands;

#[derive(Parser)]
#[command(name = "deskchat")]
#[command(version)]
#[command(about = "Terminal client for the multi-agent support desk")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the backend base URL from config
    #[arg(long, value_name = "URL", env = "DESKCHAT_BASE_URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Chat with a support agent
    Chat {
        /// Agent id to chat with (falls back to [chat].agent from config)
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// List available agents
    Agents {
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Upload a JSON/CSV ticket export for indexing
    Upload {
        /// Path to the export file
        file: PathBuf,
    },
    /// Rebuild agent knowledge-base indexes
    Reindex {
        /// Agent id (reindexes every agent when omitted)
        agent: Option<String>,
    },
    /// Show backend health
    Status,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load()?;
    if let Some(base_url) = cli.base_url {
        config.service.base_url = Some(base_url);
    }
    tracing::debug!(base_url = ?config.service.base_url, "config loaded");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        match cli.command {
            None => commands::chat::run(&config, None).await,
            Some(Commands::Chat { agent }) => {
                commands::chat::run(&config, agent.as_deref()).await
            }
            Some(Commands::Agents { json }) => commands::agents::run(&config, json).await,
            Some(Commands::Upload { file }) => commands::upload::run(&config, &file).await,
            Some(Commands::Reindex { agent }) => {
                commands::reindex::run(&config, agent.as_deref()).await
            }
            Some(Commands::Status) => commands::status::run(&config).await,
        }
    })
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
