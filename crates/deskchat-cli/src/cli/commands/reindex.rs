//! Knowledge-base reindex command.

use anyhow::{Context, Result};
use deskchat_core::config::Config;
use deskchat_core::services::agents::AgentDirectoryClient;

pub async fn run(config: &Config, agent: Option<&str>) -> Result<()> {
    let directory = AgentDirectoryClient::new(&config.service)?;

    match agent {
        Some(agent_id) => {
            let outcome = directory
                .reindex_agent(agent_id)
                .await
                .with_context(|| format!("Failed to reindex agent '{agent_id}'"))?;
            println!("{}", outcome.message);
        }
        None => {
            let outcome = directory
                .reindex_all()
                .await
                .context("Failed to reindex agents")?;
            println!("{}", outcome.message);

            let mut results: Vec<_> = outcome.results.iter().collect();
            results.sort();
            for (agent_id, count) in results {
                println!("  {agent_id}: {count} tickets");
            }
        }
    }

    Ok(())
}
