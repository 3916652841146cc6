//! OpenAI GPT adapter (and the Grok adapter, which speaks the same
//! chat-completions schema).

use async_trait::async_trait;
use meta_ai_common::{
    error::{Error, Result},
    types::{AdapterParameters, ProviderTag},
    Metadata,
};
use meta_ai_core::provider::ProviderAdapter;
use serde_json::{json, Value};
use std::time::Duration;

/// Adapter for OpenAI's chat-completions API, also reused for Grok since
/// X.AI's API is OpenAI-compatible.
pub struct ChatCompletionsAdapter {
    provider: ProviderTag,
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    ready: bool,
}

impl ChatCompletionsAdapter {
    pub fn new(provider: ProviderTag, api_key: String, base_url: String, model: String) -> Self {
        Self {
            provider,
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
            ready: false,
        }
    }

    fn default_system_prompt(&self) -> &'static str {
        match self.provider {
            ProviderTag::Grok => "You are Grok, a helpful AI assistant.",
            _ => "You are a helpful assistant.",
        }
    }
}

#[async_trait]
impl ProviderAdapter for ChatCompletionsAdapter {
    fn provider(&self) -> ProviderTag {
        self.provider
    }

    async fn initialize(&mut self) -> Result<bool> {
        if self.api_key.is_empty() {
            return Err(Error::ProviderUnavailable(format!(
                "{} API key not provided",
                self.provider
            )));
        }

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        self.ready = response.status().is_success();
        if !self.ready {
            tracing::warn!(provider = %self.provider, status = %response.status(), "adapter initialization failed");
        }
        Ok(self.ready)
    }

    async fn execute(&self, prompt: &str, metadata: &Metadata) -> Result<Value> {
        let params = AdapterParameters::from_metadata(metadata);
        let system_prompt = params
            .system_prompt
            .clone()
            .unwrap_or_else(|| self.default_system_prompt().to_string());

        let mut payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": prompt},
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        if let Some(top_p) = params.top_p {
            payload["top_p"] = json!(top_p);
        }
        if let Some(fp) = params.frequency_penalty {
            payload["frequency_penalty"] = json!(fp);
        }
        if let Some(pp) = params.presence_penalty {
            payload["presence_penalty"] = json!(pp);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(self.provider.as_str(), status, &body));
        }

        let result: Value = response.json().await?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::execution(format!("{} response missing content", self.provider)))?
            .to_string();

        Ok(json!({
            "content": content,
            "usage": result.get("usage"),
            "model": result.get("model"),
        }))
    }

    async fn health_check(&self) -> Result<bool> {
        if self.api_key.is_empty() {
            return Ok(false);
        }

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
