//! Auto-bootstrap: the default agent table registered at startup.
//!
//! Each provider family is attempted independently — one provider's
//! missing credential or unreachable endpoint never prevents the others
//! from registering.

use crate::MetaAIOrchestrator;
use meta_ai_common::config::Config;
use meta_ai_common::types::{AgentRecord, ProviderTag};
use meta_ai_agents::create_adapter;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

struct DefaultAgent {
    id: &'static str,
    name: &'static str,
    provider: ProviderTag,
    capabilities: &'static [&'static str],
}

const DEFAULT_AGENTS: &[DefaultAgent] = &[
    DefaultAgent {
        id: "claude_flow_hive",
        name: "Claude Flow Hive Mind",
        provider: ProviderTag::ClaudeFlow,
        capabilities: &["general", "code_generation", "documentation", "analysis"],
    },
    DefaultAgent {
        id: "gpt4_primary",
        name: "GPT-4",
        provider: ProviderTag::Gpt,
        capabilities: &["code_generation", "documentation", "analysis"],
    },
    DefaultAgent {
        id: "gemini_pro",
        name: "Gemini Pro",
        provider: ProviderTag::Gemini,
        capabilities: &["analysis", "documentation", "general"],
    },
    DefaultAgent {
        id: "claude3_opus",
        name: "Claude 3 Opus",
        provider: ProviderTag::Anthropic,
        capabilities: &["code_generation", "analysis", "documentation"],
    },
    DefaultAgent {
        id: "grok_beta",
        name: "Grok Beta",
        provider: ProviderTag::Grok,
        capabilities: &["analysis", "general"],
    },
];

/// Register one agent per entry in the default table whose provider is
/// enabled in `config`, initializing its adapter first. Failures are
/// logged and skipped rather than propagated, so a single bad credential
/// doesn't abort startup.
pub async fn auto_bootstrap(orchestrator: &MetaAIOrchestrator, config: &Config) {
    for default_agent in DEFAULT_AGENTS {
        let Some(agent_config) = config.agents.get(&default_agent.provider) else {
            warn!(agent_id = default_agent.id, "no configuration for provider, skipping");
            continue;
        };

        if !agent_config.enabled {
            warn!(agent_id = default_agent.id, "provider disabled, skipping");
            continue;
        }

        let mut adapter = create_adapter(default_agent.provider, agent_config);
        match adapter.initialize().await {
            Ok(true) => {
                info!(agent_id = default_agent.id, "adapter initialized");
            }
            Ok(false) | Err(_) => {
                warn!(agent_id = default_agent.id, "adapter failed to initialize, skipping");
                continue;
            }
        }

        orchestrator.register_adapter(default_agent.id.to_string(), adapter);

        let capabilities: HashSet<String> =
            default_agent.capabilities.iter().map(|s| s.to_string()).collect();

        let agent = AgentRecord::new(
            default_agent.id.to_string(),
            default_agent.name.to_string(),
            default_agent.provider,
            capabilities,
            HashMap::new(),
        );

        orchestrator.registry().register(agent);
        info!(agent_id = default_agent.id, "agent registered");
    }
}
