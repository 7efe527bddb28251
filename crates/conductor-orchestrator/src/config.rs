//! Orchestration configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-agent overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Disabled agents are never selected. Ignored for the fallback agent.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Replaces the built-in trigger keywords when set.
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { enabled: true, keywords: None }
    }
}

fn default_true() -> bool {
    true
}

fn default_agent_timeout_secs() -> u64 {
    30
}

fn default_request_deadline_secs() -> u64 {
    60
}

/// Timeouts and agent overrides for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Time budget of a single agent.
    #[serde(default = "default_agent_timeout_secs")]
    pub agent_timeout_secs: u64,
    /// Upper bound on a whole orchestration.
    #[serde(default = "default_request_deadline_secs")]
    pub request_deadline_secs: u64,
    /// Overrides keyed by agent id (`file`, `research`, ...).
    #[serde(default)]
    pub agents: BTreeMap<String, AgentSettings>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agent_timeout_secs: default_agent_timeout_secs(),
            request_deadline_secs: default_request_deadline_secs(),
            agents: BTreeMap::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Per-agent timeout as a `Duration`.
    pub const fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }

    /// Request deadline as a `Duration`.
    pub const fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }

    /// The limit actually applied to each agent: the smaller of both budgets.
    pub fn effective_agent_timeout(&self) -> Duration {
        self.agent_timeout().min(self.request_deadline())
    }

    /// Settings for one agent, defaulted when absent.
    pub fn agent(&self, id: &str) -> AgentSettings {
        self.agents.get(id).cloned().unwrap_or_default()
    }
}
