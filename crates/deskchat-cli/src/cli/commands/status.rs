//! Backend health command.

use anyhow::{Context, Result};
use deskchat_core::config::Config;
use deskchat_core::services::agents::AgentDirectoryClient;

pub async fn run(config: &Config) -> Result<()> {
    let directory = AgentDirectoryClient::new(&config.service)?;
    let status = directory.status().await.context("Failed to reach backend")?;

    println!("status: {}", status.status);
    println!("vector store ready: {}", status.vector_store_ready);
    println!("tickets indexed: {}", status.tickets_count);

    Ok(())
}
