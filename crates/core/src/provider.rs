//! Provider adapter trait: the seam every LLM/agent backend implements.

use async_trait::async_trait;
use meta_ai_common::{error::Result, types::ProviderTag, Metadata};
use serde_json::Value;

/// A provider adapter wraps one backend (an LLM API or an MCP-hosted
/// agent swarm) behind three operations. Implementations live in
/// `meta-ai-agents`; this crate only defines the contract so the engine
/// and the agents crate can depend on it without depending on each other.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider family this adapter speaks for.
    fn provider(&self) -> ProviderTag;

    /// One-time setup (e.g. spawning a hive-mind session for
    /// `claude_flow`). Returns `Ok(true)` once the adapter is ready to
    /// accept `execute` calls.
    async fn initialize(&mut self) -> Result<bool>;

    /// Run a single prompt against the backend and return its raw
    /// structured output. `metadata` carries request overrides
    /// (temperature, max_tokens, ...) via `AdapterParameters`.
    async fn execute(&self, prompt: &str, metadata: &Metadata) -> Result<Value>;

    /// Cheap liveness probe, independent of `execute`.
    async fn health_check(&self) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubAdapter {
        ready: bool,
    }

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        fn provider(&self) -> ProviderTag {
            ProviderTag::Gpt
        }

        async fn initialize(&mut self) -> Result<bool> {
            self.ready = true;
            Ok(true)
        }

        async fn execute(&self, prompt: &str, _metadata: &Metadata) -> Result<Value> {
            Ok(serde_json::json!({ "echo": prompt }))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(self.ready)
        }
    }

    #[tokio::test]
    async fn adapter_becomes_ready_after_initialize() {
        let mut adapter = StubAdapter { ready: false };
        assert!(!adapter.health_check().await.unwrap());
        adapter.initialize().await.unwrap();
        assert!(adapter.health_check().await.unwrap());
    }
}
