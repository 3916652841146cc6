//! Anthropic Claude Messages API adapter.

use async_trait::async_trait;
use meta_ai_common::{
    error::{Error, Result},
    types::{AdapterParameters, ProviderTag},
    Metadata,
};
use meta_ai_core::provider::ProviderAdapter;
use serde_json::{json, Value};
use std::time::Duration;

pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    ready: bool,
}

impl AnthropicAdapter {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
            ready: false,
        }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> ProviderTag {
        ProviderTag::Anthropic
    }

    async fn initialize(&mut self) -> Result<bool> {
        if self.api_key.is_empty() {
            return Err(Error::ProviderUnavailable(
                "Anthropic API key not provided".to_string(),
            ));
        }
        // Anthropic has no cheap unauthenticated probe endpoint; presence
        // of a key is accepted the way the adapter this is grounded on does.
        self.ready = true;
        Ok(true)
    }

    async fn execute(&self, prompt: &str, metadata: &Metadata) -> Result<Value> {
        let params = AdapterParameters::from_metadata(metadata);

        let mut payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        if let Some(system_prompt) = &params.system_prompt {
            payload["system"] = json!(system_prompt);
        }

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status("Anthropic", status, &body));
        }

        let result: Value = response.json().await?;
        let content = result["content"][0]["text"]
            .as_str()
            .ok_or_else(|| Error::execution("Anthropic response missing content"))?
            .to_string();

        Ok(json!({
            "content": content,
            "usage": result.get("usage"),
            "model": result.get("model"),
            "stop_reason": result.get("stop_reason"),
        }))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.api_key.is_empty())
    }
}
