//! Adapter factory: turns a [`ProviderTag`] plus its [`AgentConfig`] into
//! a boxed [`ProviderAdapter`].

use crate::{claude_flow::ClaudeFlowAdapter, gemini::GeminiAdapter, gpt::ChatCompletionsAdapter};
use crate::anthropic::AnthropicAdapter;
use meta_ai_common::config::AgentConfig;
use meta_ai_common::types::ProviderTag;
use meta_ai_core::provider::ProviderAdapter;

/// Build the adapter for `tag` from its resolved config. The tag set is
/// closed — every `ProviderTag` variant has exactly one adapter — so
/// this never returns an "unknown provider" error; that error belongs to
/// `ProviderTag::parse` at the control-API boundary.
pub fn create_adapter(tag: ProviderTag, config: &AgentConfig) -> Box<dyn ProviderAdapter> {
    let api_key = config
        .api_key
        .as_ref()
        .map(|s| secrecy::ExposeSecret::expose_secret(s).clone())
        .unwrap_or_default();

    match tag {
        ProviderTag::Gpt | ProviderTag::Grok => Box::new(ChatCompletionsAdapter::new(
            tag,
            api_key,
            config.base_url.clone(),
            config.model.clone(),
        )),
        ProviderTag::Gemini => Box::new(GeminiAdapter::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
        )),
        ProviderTag::Anthropic => Box::new(AnthropicAdapter::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
        )),
        ProviderTag::ClaudeFlow => Box::new(ClaudeFlowAdapter::new(config.base_url.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_an_adapter_for_every_tag() {
        let config = AgentConfig {
            api_key: None,
            base_url: "http://localhost:8051".to_string(),
            model: "test-model".to_string(),
            enabled: true,
        };

        for tag in [
            ProviderTag::ClaudeFlow,
            ProviderTag::Gpt,
            ProviderTag::Gemini,
            ProviderTag::Grok,
            ProviderTag::Anthropic,
        ] {
            let adapter = create_adapter(tag, &config);
            assert_eq!(adapter.provider(), tag);
        }
    }
}
