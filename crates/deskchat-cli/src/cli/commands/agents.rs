//! Agents listing command.

use anyhow::{Context, Result};
use deskchat_core::config::Config;
use deskchat_core::services::agents::AgentDirectoryClient;

pub async fn run(config: &Config, json: bool) -> Result<()> {
    let directory = AgentDirectoryClient::new(&config.service)?;
    let list = directory
        .list_agents()
        .await
        .context("Failed to list agents")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if list.agents.is_empty() {
        println!("No agents configured.");
        return Ok(());
    }

    for agent in &list.agents {
        let readiness = if agent.is_ready { "ready" } else { "awaiting data" };
        println!(
            "{:<16} {:<24} {:>6} tickets  {}",
            agent.id, agent.name, agent.tickets_count, readiness
        );
        if !agent.description.is_empty() {
            println!("{:16} {}", "", agent.description);
        }
    }
    println!("{} agents total", list.total);

    Ok(())
}
