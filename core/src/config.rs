//! Agent service configuration
//!
//! Defaults point at a local agent server; the base URL and agent id can be
//! overridden through environment variables or CLI flags.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL of the agent service
pub const DEFAULT_BASE_URL: &str = "http://localhost:4111";
/// Default agent identifier
pub const DEFAULT_AGENT_ID: &str = "terminalAgent";
/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "TERMAI_AGENT_URL";
/// Environment variable overriding the agent id
pub const AGENT_ID_ENV: &str = "TERMAI_AGENT_ID";

const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 3;

/// Connection settings for the remote agent service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the agent service
    pub base_url: String,
    /// Identifier of the agent to invoke
    pub agent_id: String,
    /// Timeout for the connectivity probe, in seconds
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

fn default_health_timeout() -> u64 {
    DEFAULT_HEALTH_TIMEOUT_SECS
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
        }
    }
}

impl AgentConfig {
    /// Build a config from defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = AgentConfig::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim_end_matches('/').to_string();
            }
        }
        if let Ok(agent) = std::env::var(AGENT_ID_ENV) {
            if !agent.trim().is_empty() {
                config.agent_id = agent;
            }
        }
        config
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url: String = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the agent identifier
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    /// Timeout used by the connectivity probe
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}
