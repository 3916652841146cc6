//! Google Gemini adapter.

use async_trait::async_trait;
use meta_ai_common::{
    error::{Error, Result},
    types::{AdapterParameters, ProviderTag},
    Metadata,
};
use meta_ai_core::provider::ProviderAdapter;
use serde_json::{json, Value};
use std::time::Duration;

pub struct GeminiAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    ready: bool,
}

impl GeminiAdapter {
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
impl ProviderAdapter for GeminiAdapter {
    fn provider(&self) -> ProviderTag {
        ProviderTag::Gemini
    }

    async fn initialize(&mut self) -> Result<bool> {
        if self.api_key.is_empty() {
            return Err(Error::ProviderUnavailable(
                "Google API key not provided".to_string(),
            ));
        }

        let response = self
            .client
            .get(format!("{}/models?key={}", self.base_url, self.api_key))
            .send()
            .await?;

        self.ready = response.status().is_success();
        Ok(self.ready)
    }

    async fn execute(&self, prompt: &str, metadata: &Metadata) -> Result<Value> {
        let params = AdapterParameters::from_metadata(metadata);

        let mut payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": params.temperature,
                "maxOutputTokens": params.max_tokens,
                "topP": params.top_p.unwrap_or(0.95),
                "topK": 40,
            },
        });

        if let Some(system_prompt) = &params.system_prompt {
            payload["systemInstruction"] = json!({ "parts": [{ "text": system_prompt }] });
        }

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.base_url, self.model, self.api_key
            ))
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status("Gemini", status, &body));
        }

        let result: Value = response.json().await?;
        let content = result["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| Error::execution("Gemini response missing content"))?
            .to_string();

        Ok(json!({
            "content": content,
            "safety_ratings": result["candidates"][0].get("safetyRatings"),
            "model": self.model,
        }))
    }

    async fn health_check(&self) -> Result<bool> {
        if self.api_key.is_empty() {
            return Ok(false);
        }

        let response = self
            .client
            .get(format!("{}/models?key={}", self.base_url, self.api_key))
            .timeout(Duration::from_secs(5))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
