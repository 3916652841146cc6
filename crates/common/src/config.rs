//! Configuration loading: defaults, `config.toml`, then environment overrides

use crate::types::ProviderTag;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub orchestrator: OrchestratorConfig,
    pub agents: HashMap<ProviderTag, AgentConfig>,
    pub observability: ObservabilityConfig,
}

/// Control API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    /// Defaults to 8053; overridable by `ARCHON_ORCHESTRATOR_PORT`.
    pub port: u16,
    pub request_timeout_ms: u64,
}

/// Orchestrator engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Fixed worker pool size (default 10).
    pub worker_count: usize,
    pub task_queue_capacity: usize,
    pub default_max_retries: u32,
    /// Queue-pull timeout per worker iteration.
    pub queue_pull_timeout_ms: u64,
    /// Adapter `execute` timeout.
    pub execute_timeout_ms: u64,
    /// Adapter `health_check` timeout.
    pub health_check_timeout_ms: u64,
    /// Dependency watcher scan cadence.
    pub dependency_watch_interval_ms: u64,
    /// Backoff applied by a worker after finding no eligible agent.
    pub selector_backoff_ms: u64,
}

/// Per-provider-family agent configuration, consumed by auto-bootstrap
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub model: String,
    pub enabled: bool,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
    pub metrics_port: u16,
    pub tracing_enabled: bool,
    pub otlp_endpoint: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Config {
    /// Load configuration from defaults, `config.toml` if present, then
    /// environment overrides. Two environment namespaces are read: the
    /// structured `META_AI__*` overrides (teacher style) and the literal
    /// provider credential names the control surface documents
    /// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GOOGLE_API_KEY`,
    /// `XAI_API_KEY`, `ARCHON_ORCHESTRATOR_PORT`) — the latter win when
    /// both are present since they name the exact credential.
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8053)?
            .set_default("server.request_timeout_ms", 30000)?
            .set_default("orchestrator.worker_count", 10)?
            .set_default("orchestrator.task_queue_capacity", 1000)?
            .set_default("orchestrator.default_max_retries", 3)?
            .set_default("orchestrator.queue_pull_timeout_ms", 1000)?
            .set_default("orchestrator.execute_timeout_ms", 60000)?
            .set_default("orchestrator.health_check_timeout_ms", 5000)?
            .set_default("orchestrator.dependency_watch_interval_ms", 1000)?
            .set_default("orchestrator.selector_backoff_ms", 1000)?
            .set_default("observability.metrics_enabled", true)?
            .set_default("observability.metrics_port", 9090)?
            .set_default("observability.tracing_enabled", false)?
            .set_default("observability.log_level", "info")?
            .set_default("observability.log_format", "pretty")?;

        if Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("META_AI")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Config = builder.build()?.try_deserialize()?;
        config.apply_provider_env_overrides();
        Ok(config)
    }

    /// Apply the documented literal environment variable names on top of
    /// whatever `agents` table resulted from file/META_AI config.
    fn apply_provider_env_overrides(&mut self) {
        let overrides: [(ProviderTag, &str); 4] = [
            (ProviderTag::Gpt, "OPENAI_API_KEY"),
            (ProviderTag::Anthropic, "ANTHROPIC_API_KEY"),
            (ProviderTag::Gemini, "GOOGLE_API_KEY"),
            (ProviderTag::Grok, "XAI_API_KEY"),
        ];

        for (tag, var) in overrides {
            if let Ok(key) = std::env::var(var) {
                let entry = self.agents.entry(tag).or_insert_with(|| AgentConfig {
                    api_key: None,
                    base_url: default_base_url(tag),
                    model: default_model(tag),
                    enabled: true,
                });
                entry.api_key = Some(Secret::new(key));
                entry.enabled = true;
            }
        }

        // claude_flow is always attempted against its MCP endpoint,
        // credential-less.
        self.agents
            .entry(ProviderTag::ClaudeFlow)
            .or_insert_with(|| AgentConfig {
                api_key: None,
                base_url: std::env::var("ARCHON_MCP_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:8051".to_string()),
                model: "hive-mind".to_string(),
                enabled: true,
            });

        if let Ok(port) = std::env::var("ARCHON_ORCHESTRATOR_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// At least one agent family must be enabled for the service to be
    /// useful; checked at startup, not at parse time.
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("Server port must be greater than 0".to_string());
        }

        let enabled_agents = self.agents.values().filter(|a| a.enabled).count();
        if enabled_agents == 0 {
            errors.push("At least one agent provider must be enabled".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Exposed so callers that build an [`AgentConfig`] outside the bootstrap
/// path (the Control API's register-agent handler) can fall back to the
/// same per-provider defaults.
pub fn default_base_url(tag: ProviderTag) -> String {
    match tag {
        ProviderTag::Gpt => "https://api.openai.com/v1".to_string(),
        ProviderTag::Grok => "https://api.x.ai/v1".to_string(),
        ProviderTag::Gemini => "https://generativelanguage.googleapis.com/v1beta".to_string(),
        ProviderTag::Anthropic => "https://api.anthropic.com/v1".to_string(),
        ProviderTag::ClaudeFlow => "http://localhost:8051".to_string(),
    }
}

pub fn default_model(tag: ProviderTag) -> String {
    match tag {
        ProviderTag::Gpt => "gpt-4".to_string(),
        ProviderTag::Grok => "grok-beta".to_string(),
        ProviderTag::Gemini => "gemini-pro".to_string(),
        ProviderTag::Anthropic => "claude-3-opus-20240229".to_string(),
        ProviderTag::ClaudeFlow => "hive-mind".to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8053,
                request_timeout_ms: 30000,
            },
            orchestrator: OrchestratorConfig {
                worker_count: 10,
                task_queue_capacity: 1000,
                default_max_retries: 3,
                queue_pull_timeout_ms: 1000,
                execute_timeout_ms: 60000,
                health_check_timeout_ms: 5000,
                dependency_watch_interval_ms: 1000,
                selector_backoff_ms: 1000,
            },
            agents: HashMap::new(),
            observability: ObservabilityConfig {
                metrics_enabled: true,
                metrics_port: 9090,
                tracing_enabled: false,
                otlp_endpoint: None,
                log_level: "info".to_string(),
                log_format: LogFormat::Pretty,
            },
        }
    }
}
