//! Agent directory client (`/api/agents`, `/api/status`).
//!
//! Backs the hub screen: listing agents, reading one agent's status,
//! forcing a knowledge-base reindex, and the overall backend health check.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::services::shared::{
    ServiceResult, build_http_client, classify_reqwest_error, decode_json,
};

/// One agent as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub tickets_count: u64,
    #[serde(default)]
    pub is_ready: bool,
}

/// Response of the agent list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentList {
    #[serde(default)]
    pub agents: Vec<AgentSummary>,
    #[serde(default)]
    pub total: u64,
}

/// Response of a single-agent reindex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tickets_indexed: u64,
}

/// Response of a reindex across all agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexAllOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Tickets indexed per agent id.
    #[serde(default)]
    pub results: HashMap<String, u64>,
}

/// Response of the backend health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendStatus {
    pub status: String,
    #[serde(default)]
    pub vector_store_ready: bool,
    #[serde(default)]
    pub tickets_count: u64,
}

/// HTTP client for the agent directory endpoints.
pub struct AgentDirectoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentDirectoryClient {
    /// Creates a client from resolved connection settings.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot be resolved.
    pub fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        let base_url = crate::services::resolve_base_url(
            config.base_url.as_deref(),
            crate::config::BASE_URL_ENV_VAR,
        )?;
        Ok(Self {
            http: build_http_client(config.timeout()),
            base_url,
        })
    }

    /// Lists all available agents with their status.
    ///
    /// # Errors
    /// Returns a `ServiceError` on transport, status, or decode failure.
    pub async fn list_agents(&self) -> ServiceResult<AgentList> {
        let url = format!("{}/api/agents", self.base_url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        decode_json(response).await
    }

    /// Fetches one agent's status.
    ///
    /// # Errors
    /// Returns a `ServiceError` on transport, status, or decode failure.
    pub async fn agent_status(&self, agent_id: &str) -> ServiceResult<AgentSummary> {
        let url = format!("{}/api/agents/{agent_id}", self.base_url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        decode_json(response).await
    }

    /// Forces a reindex of one agent's knowledge base.
    ///
    /// # Errors
    /// Returns a `ServiceError` on transport, status, or decode failure.
    pub async fn reindex_agent(&self, agent_id: &str) -> ServiceResult<ReindexOutcome> {
        debug!(agent_id, "requesting reindex");
        let url = format!("{}/api/agents/{agent_id}/reindex", self.base_url);
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        decode_json(response).await
    }

    /// Forces a reindex of every agent's knowledge base.
    ///
    /// # Errors
    /// Returns a `ServiceError` on transport, status, or decode failure.
    pub async fn reindex_all(&self) -> ServiceResult<ReindexAllOutcome> {
        let url = format!("{}/api/agents/reindex-all", self.base_url);
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        decode_json(response).await
    }

    /// Reads the backend health summary.
    ///
    /// # Errors
    /// Returns a `ServiceError` on transport, status, or decode failure.
    pub async fn status(&self) -> ServiceResult<BackendStatus> {
        let url = format!("{}/api/status", self.base_url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        decode_json(response).await
    }
}
