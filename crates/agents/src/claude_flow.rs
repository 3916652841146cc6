//! Claude Flow adapter: wraps calls to an MCP-hosted hive-mind swarm as
//! tool invocations rather than a chat completion.

use async_trait::async_trait;
use meta_ai_common::{
    error::{Error, Result},
    types::ProviderTag,
    Metadata,
};
use meta_ai_core::provider::ProviderAdapter;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::time::Duration;

pub struct ClaudeFlowAdapter {
    client: reqwest::Client,
    mcp_endpoint: String,
    swarm_id: Mutex<Option<String>>,
}

impl ClaudeFlowAdapter {
    pub fn new(mcp_endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            mcp_endpoint,
            swarm_id: Mutex::new(None),
        }
    }

    /// Spawn a hive-mind swarm with `objective` as its strategic goal.
    /// Idempotent in the sense that a swarm is only spawned once per
    /// adapter instance; subsequent `execute` calls reuse it.
    async fn spawn_swarm(&self, objective: &str) -> Result<()> {
        let payload = json!({
            "tool": "hive_mind_spawn",
            "arguments": {
                "objective": objective,
                "queen_type": "strategic",
                "max_workers": 4,
                "consensus": "majority",
            },
        });

        let response = self
            .client
            .post(format!("{}/tools/hive_mind_spawn", self.mcp_endpoint))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::execution(format!(
                "hive_mind_spawn returned {}",
                response.status()
            )));
        }

        let result: Value = response.json().await?;
        if let Some(id) = result.get("swarm_id").and_then(|v| v.as_str()) {
            *self.swarm_id.lock() = Some(id.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for ClaudeFlowAdapter {
    fn provider(&self) -> ProviderTag {
        ProviderTag::ClaudeFlow
    }

    async fn initialize(&mut self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.mcp_endpoint))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    async fn execute(&self, prompt: &str, metadata: &Metadata) -> Result<Value> {
        if self.swarm_id.lock().is_none() {
            let objective: String = prompt.chars().take(100).collect();
            self.spawn_swarm(&objective).await?;
        }

        let title: String = prompt.chars().take(100).collect();
        let payload = json!({
            "tool": "archon:manage_task",
            "arguments": {
                "action": "create",
                "title": title,
                "description": prompt,
                "metadata": metadata,
            },
        });

        let response = self
            .client
            .post(format!("{}/tools/archon:manage_task", self.mcp_endpoint))
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::execution(format!(
                "MCP returned {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.mcp_endpoint))
            .timeout(Duration::from_secs(5))
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}
