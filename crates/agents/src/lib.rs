#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

//! Provider adapter implementations: one module per backend family, plus
//! the factory that resolves a [`meta_ai_common::types::ProviderTag`] to
//! a boxed adapter.

pub mod anthropic;
pub mod claude_flow;
pub mod factory;
pub mod gemini;
pub mod gpt;

pub use anthropic::AnthropicAdapter;
pub use claude_flow::ClaudeFlowAdapter;
pub use factory::create_adapter;
pub use gemini::GeminiAdapter;
pub use gpt::ChatCompletionsAdapter;
